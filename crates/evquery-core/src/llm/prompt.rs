//! Prompt construction for query conversion

use super::ChatMessage;

const SYSTEM_PROMPT: &str = "You are an expert generator of Everything file-search syntax. \
     Convert the user's natural language request into Everything search syntax. \
     Output ONLY a single JSON object, with no other text.";

/// Everything search syntax reference embedded in every conversion prompt
pub const SYNTAX_REFERENCE: &str = r#"[Operators]
space	AND
|	OR
!	NOT
< >	Grouping
" "	Search for an exact phrase

[Wildcards]
*	Matches zero or more characters
?	Matches one character

[Functions]
size:<size>	files of the given size
datemodified:<date>	files modified on the given date
dm:<date>	short form of datemodified
ext:<list>	files with one of the given extensions (semicolon separated)
content:<text>	files containing the given text
parent:<path>	files located in the given folder
*.mp3	mp3 files
dm:today	files modified today
dm:thisweek	files modified this week

[Date keywords]
today, yesterday, thisweek, thismonth, thisyear
lastweek, lastmonth, lastyear

[Size syntax]
size:>1mb	larger than 1 MB
size:<100kb	smaller than 100 KB
size:1mb..10mb	between 1 MB and 10 MB

[File type groups]
images: *.jpg;*.png;*.gif;*.bmp;*.jpeg
documents: *.doc;*.docx;*.pdf;*.txt
videos: *.mp4;*.avi;*.mkv;*.mov
audio: *.mp3;*.wav;*.flac

[Examples]
PDF documents from today: dm:today *.pdf
videos larger than 1 MB: size:>1mb *.mp4;*.avi;*.mkv
images modified this week: dm:thisweek *.jpg;*.png;*.gif"#;

const OUTPUT_SCHEMA: &str = r#"{
  "confidence": 0.95,
  "original_query": "the user's original request",
  "rules_used": ["syntax rules that were applied"],
  "alternatives": ["alternative query 1", "alternative query 2"],
  "query": "the Everything search query"
}"#;

/// Build the system + user message pair for converting `query`
pub fn build_messages(query: &str) -> [ChatMessage; 2] {
    [
        ChatMessage::system(SYSTEM_PROMPT),
        ChatMessage::user(build_conversion_prompt(query)),
    ]
}

fn build_conversion_prompt(query: &str) -> String {
    format!(
        r#"Convert the following natural language request into valid Everything search syntax.

{}

[User request]
{}

[Output format]
Reply strictly with JSON in exactly this shape and nothing else:
{}"#,
        SYNTAX_REFERENCE, query, OUTPUT_SCHEMA
    )
}
