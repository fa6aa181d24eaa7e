//! # Extraction Prompts
//!
//! Instructions for the first model call, which receives the bookshelf photo and
//! returns a raw book table. Both variants share the CSV contract: the exact
//! header `title,author,coordinates` and every field in double quotes.

use serde::{Deserialize, Serialize};

/// Literal transcription with normalized `[ymin, xmin, ymax, xmax]` boxes.
///
/// The model is told to copy what it sees, misspellings included, so the
/// verification stage has faithful input to correct.
pub const EXTRACTION_NORMALIZED_BOX_PROMPT: &str = r#"
You are an expert visual analysis AI. Your task is to analyze the provided image of a bookshelf, identify every visible book, and return the raw extracted data in a structured CSV format.
Instructions:
Analyze the Image: Scan the entire image and identify the bounding box for every visible book (spines or covers).
Extract Information: For each book, extract the following:
Title: The raw text of the book's title, exactly as it appears.
Author: The raw text of the author's name, exactly as it appears.
Coordinates: The normalized bounding box for the book spine [ymin, xmin, ymax, xmax].
Format Output: Return a single string in CSV (Comma Separated Values) format.
The first line must be the header row: title,author,coordinates
Each subsequent line must represent one book.
Formatting Rules:
Title/Author:
Transcribe the text for the title and author as accurately as possible, even if it is blurry, partially obscured, or appears misspelled.
Your goal is to extract the literal text you see, not to correct it or identify the real book. Output the "messed up" text exactly as you read it.
Only use the string Unknown as a last resort if a title or author is completely unreadable or not visible (e.g., a blank spine, a solid blur, facing away).
Enclose titles and authors in double quotes ("") to handle any commas within them.
Coordinates:
Provide the normalized bounding box [ymin, xmin, ymax, xmax].
All four values must be floats between 0.0 and 1.0.
This entire array string must be enclosed in double quotes in the CSV.
Example Output:
title,author,coordinates
"The Crtcher in the Tye","J.D. Salnger","[0.25, 0.10, 0.45, 0.15]"
"To Kill a Mockingbirdf","Hprper Lee","[0.25, 0.16, 0.45, 0.21]"
"Unknown","Unknown","[0.25, 0.22, 0.45, 0.27]"
Process the attached image and provide only the CSV-formatted string as your response.
"#;

/// Real-book identification with padded pixel-space quadrilaterals.
///
/// Spines photographed at an angle are not axis-aligned, so this variant asks
/// for four corners in image pixels, widened slightly so the whole spine is
/// inside the outline.
pub const EXTRACTION_PIXEL_QUADRILATERAL_PROMPT: &str = r#"
You are an expert visual analysis AI and librarian. Your task is to find every real book in the provided image of a bookshelf and return the books you find in a structured CSV format.
Instructions:
Analyze the Image: Scan the entire image and locate every book whose spine or cover is visible.
Identify Each Book: For each book, determine:
Title: The title of the real, published book shown on the spine or cover.
Author: The author of that book.
Coordinates: The outline of the book spine as a quadrilateral in image pixels.
Format Output: Return a single string in CSV (Comma Separated Values) format.
The first line must be the header row: title,author,coordinates
Each subsequent line must represent one book.
Formatting Rules:
Title/Author:
Report the real title and author of the book. If the printed text is partially hidden, use what is visible to identify the book.
Only use the string Unknown if the title or author cannot be identified at all (e.g., a blank spine, a solid blur, facing away).
Enclose titles and authors in double quotes ("") to handle any commas within them.
Coordinates:
Provide the four corners of the spine as absolute pixel positions in the original image: [x1, y1, x2, y2, x3, y3, x4, y4].
List the corners in this order: top-left, top-right, bottom-right, bottom-left.
Pad the outline by a few pixels on every side so the entire spine, including its edges, lies inside it.
Follow the tilt of the spine; do not force the outline to be axis-aligned.
All eight values must be whole numbers.
This entire array string must be enclosed in double quotes in the CSV.
Example Output:
title,author,coordinates
"The Catcher in the Rye","J.D. Salinger","[112, 40, 168, 42, 165, 610, 109, 608]"
"To Kill a Mockingbird","Harper Lee","[170, 38, 231, 38, 231, 612, 170, 612]"
"Unknown","Unknown","[234, 55, 280, 57, 278, 605, 232, 603]"
Process the attached image and provide only the CSV-formatted string as your response.
"#;

/// Which extraction prompt the first pipeline stage uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionVariant {
    /// Literal transcription, normalized `[ymin, xmin, ymax, xmax]` boxes.
    #[default]
    NormalizedBox,
    /// Real-book identification, padded pixel quadrilaterals.
    PixelQuadrilateral,
}

impl ExtractionVariant {
    /// The built-in prompt for this variant.
    pub fn default_prompt(self) -> &'static str {
        match self {
            ExtractionVariant::NormalizedBox => EXTRACTION_NORMALIZED_BOX_PROMPT,
            ExtractionVariant::PixelQuadrilateral => EXTRACTION_PIXEL_QUADRILATERAL_PROMPT,
        }
    }

    /// How many numbers each `coordinates` field holds under this variant.
    pub fn coordinate_count(self) -> usize {
        match self {
            ExtractionVariant::NormalizedBox => 4,
            ExtractionVariant::PixelQuadrilateral => 8,
        }
    }
}
