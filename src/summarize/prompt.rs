use super::options::{SummaryFormat, SummaryLength, SummaryOptions};

pub fn format_instruction(format: SummaryFormat) -> &'static str {
    match format {
        SummaryFormat::BulletPoints => "Provide the summary in clear bullet points",
        SummaryFormat::Narrative => "Write the summary as a flowing narrative story",
        SummaryFormat::Markdown => {
            "Format the summary using markdown with appropriate headings and structure"
        }
    }
}

pub fn length_instruction(length: SummaryLength) -> &'static str {
    match length {
        SummaryLength::Short => "Keep the summary concise, around 100-150 words",
        SummaryLength::Medium => "Provide a comprehensive summary of 200-300 words",
        SummaryLength::Long => "Create a detailed summary of 400-500 words",
    }
}

/// Instruction asking for a summary of a whole transcript
pub fn summary_prompt(transcript: &str, options: &SummaryOptions) -> String {
    format!(
        "Please summarize the following video transcript.\n\
         \n\
         Format: {}\n\
         Length: {}\n\
         Language: Please provide the summary in {}\n\
         \n\
         Focus on the main topics, key insights, and important information covered in the video.\n\
         \n\
         Transcript: {}\n\
         \n\
         Summary:",
        format_instruction(options.format),
        length_instruction(options.length),
        options.language,
        transcript,
    )
}

/// Instruction for one chunk of a transcript too long for a single request
pub fn partial_prompt(chunk: &str, index: usize, total: usize, options: &SummaryOptions) -> String {
    format!(
        "The following is part {} of {} of a long video transcript.\n\
         Summarize this part so it can later be merged with the summaries of the other parts.\n\
         \n\
         Language: Please provide the summary in {}\n\
         \n\
         Focus on the main topics, key insights, and important information covered in this part.\n\
         \n\
         Transcript part: {}\n\
         \n\
         Summary:",
        index + 1,
        total,
        options.language,
        chunk,
    )
}

/// Instruction merging partial summaries into the final one
pub fn combine_prompt(partials: &[String], options: &SummaryOptions) -> String {
    let sections = partials
        .iter()
        .enumerate()
        .map(|(i, summary)| format!("Part {}:\n{}", i + 1, summary))
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "Please combine the following partial summaries of a single video into one summary.\n\
         \n\
         Format: {}\n\
         Length: {}\n\
         Language: Please provide the summary in {}\n\
         \n\
         Remove repetition and keep the main topics, key insights, and important information.\n\
         \n\
         Partial summaries:\n{}\n\
         \n\
         Summary:",
        format_instruction(options.format),
        length_instruction(options.length),
        options.language,
        sections,
    )
}
