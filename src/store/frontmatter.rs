use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Frontmatter {
    pub title: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub date: Option<String>,
    /// Id or title of the note this one is composed into.
    pub parent: Option<String>,
}

impl Frontmatter {
    /// Parse YAML frontmatter from content.
    /// Returns the parsed Frontmatter (if valid) and the line index where content starts.
    /// Content line 1 is the line at that index; every line address in the store
    /// is relative to it.
    pub fn parse(content: &str) -> (Option<Self>, usize) {
        let lines: Vec<&str> = content.lines().collect();

        if lines.is_empty() || lines[0].trim() != "---" {
            return (None, 0);
        }
        let end_index = match lines.iter().skip(1).position(|line| line.trim() == "---") {
            Some(i) => i + 1,
            None => return (None, 0), // No closing delimiter
        };

        let yaml_content: String = lines[1..end_index].join("\n");
        let frontmatter = serde_yaml::from_str::<Frontmatter>(&yaml_content).ok();

        (frontmatter, end_index + 1)
    }
}
