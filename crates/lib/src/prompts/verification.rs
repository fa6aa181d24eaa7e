//! # Verification Prompt
//!
//! Instructions for the second, text-only model call. It receives the raw
//! extraction CSV appended to the template and returns a corrected table in the
//! same format, with coordinates copied through untouched.

pub const VERIFICATION_PROMPT: &str = r#"
You are an expert librarian and data verification AI. Your task is to clean and verify a CSV string of book data provided by an upstream OCR model. This raw data contains the model's best guess of the text, which may be misspelled, garbled, or partially correct.
You will receive a single CSV string as input. Your goal is to parse it, use your knowledge to identify the real book and author, and then output a new, cleaned CSV string in the exact same format.
Instructions:
Parse CSV: The input will be a CSV string with the header: title,author,coordinates.
Process Each Row:
Coordinates: Copy the coordinates value from the input to the output exactly as-is. Do not modify or analyze it.
Verification & Correction: Use your extensive knowledge of literature to identify the most likely real book and author based on the garbled text.
Correct obvious OCR errors and misspellings (e.g., "The Crtcher in the Tye" -> "The Catcher in the Rye"; "J.D. Salnger" -> "J.D. Salinger").
Fix errors where letters are mistaken for numbers or vice-versa (e.g., "1q84" -> "1Q84"; "Haruk1 Murakani" -> "Haruki Murakami").
If one field is 'Unknown' but the other is recognizable (e.g., Title: "Unknown", Author: "Steven Kng"), use the recognizable field to find the correct title or author.
If a field is literally "Unknown" and the other field provides no context, copy it as "Unknown".
If a field contains complete gibberish that cannot be plausibly corrected to a real title or author (e.g., "aj%@k*!"), output "Unknown" for that field.
If the capitalization is non-standard, normalize it (e.g., Title: "THE LONG WALK", Author: "Stephen King" -> Title: "The Long Walk", Author: "Stephen King").
Format Output:
Your entire response must be a single CSV-formatted string.
It must begin with the header row: title,author,coordinates
Enclose all fields (title, author, and coordinates) in double quotes ("").
Example Input:
title,author,coordinates
"The Crtcher in the Tye","J.D. Salnger","[0.25, 0.10, 0.45, 0.15]"
"1q84","Haruk1 Murakani","[0.25, 0.16, 0.45, 0.21]"
"Unknown","Steven Kng","[0.25, 0.22, 0.45, 0.27]"
"Moby Dck","Herman Melvlle","[0.25, 0.28, 0.45, 0.33]"
"The lluminatlons","Artbur Rimbaudl","[0.25, 0.34, 0.45, 0.39]"
"aj%@k*!","as dflkj","[0.25, 0.40, 0.45, 0.45]"

Example Output (Your Response):
title,author,coordinates
"The Catcher in the Rye","J.D. Salinger","[0.25, 0.10, 0.45, 0.15]"
"1Q84","Haruki Murakami","[0.25, 0.16, 0.45, 0.21]"
"The Shining","Stephen King","[0.25, 0.22, 0.45, 0.27]"
"Moby-Dick","Herman Melville","[0.25, 0.28, 0.45, 0.33]"
"Illuminations","Arthur Rimbaud","[0.25, 0.34, 0.45, 0.39]"
"Unknown","Unknown","[0.25, 0.40, 0.45, 0.45]"

Here is the csv input:
"#;

/// Appends the raw extraction CSV to the verification template, verbatim.
pub fn build_verification_prompt(template: &str, raw_csv: &str) -> String {
    let mut prompt = String::with_capacity(template.len() + raw_csv.len());
    prompt.push_str(template);
    prompt.push_str(raw_csv);
    prompt
}
