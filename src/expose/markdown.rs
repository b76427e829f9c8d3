//! Parser for the exposé markdown dialect.
//!
//! The model answers in a narrow markdown subset and the editor keeps it
//! that way: `## ` headline, `**Heading**` lines, `**Label:** value`
//! lines, `- ` bullets, blank separators, plain paragraphs. Anything
//! fancier degrades gracefully to a paragraph.

/// One rendered line of the exposé.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    /// `## FAMILIE WEBER AUS DORTMUND`
    Title(String),
    /// A line that is entirely bold: `**Familienmitglieder:**`
    Heading(String),
    /// Bold label with trailing text: `**Budget:** 12.000 €`
    LabelValue { label: String, value: String },
    /// `- Terrasse mit Überdachung`
    Bullet(String),
    /// Anything else with content
    Paragraph(String),
    /// Blank separator line
    Blank,
}

/// Parse exposé markdown into blocks, line by line.
pub fn parse(content: &str) -> Vec<Block> {
    content.lines().map(parse_line).collect()
}

fn parse_line(raw: &str) -> Block {
    let line = raw.trim();

    if line.is_empty() {
        return Block::Blank;
    }

    if let Some(rest) = line.strip_prefix("## ") {
        return Block::Title(rest.trim().to_string());
    }

    // Whole-line bold beats label:value — `**Budget:**` with no trailing
    // text is a heading, `**Budget:** 12.000 €` is not.
    if line.len() > 4 && line.starts_with("**") && line.ends_with("**") {
        return Block::Heading(line[2..line.len() - 2].trim().to_string());
    }

    if line.starts_with("**") {
        if let Some(close) = line[2..].find(":**") {
            let label = line[2..2 + close].trim().to_string();
            let value = line[2 + close + 3..].trim().to_string();
            if !label.is_empty() {
                return Block::LabelValue { label, value };
            }
        }
    }

    if let Some(rest) = line.strip_prefix("- ") {
        return Block::Bullet(rest.trim().to_string());
    }

    Block::Paragraph(line.to_string())
}

/// Pull the headline out of an exposé, e.g. for default filenames.
pub fn title_of(content: &str) -> Option<String> {
    parse(content).into_iter().find_map(|b| match b {
        Block::Title(t) if !t.is_empty() => Some(t),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_title_line() {
        let blocks = parse("## FAMILIE WEBER AUS DORTMUND");
        assert_eq!(
            blocks,
            vec![Block::Title("FAMILIE WEBER AUS DORTMUND".into())]
        );
    }

    #[test]
    fn parse_heading_line() {
        let blocks = parse("**Familienmitglieder:**");
        assert_eq!(blocks, vec![Block::Heading("Familienmitglieder:".into())]);
    }

    #[test]
    fn parse_label_value_line() {
        let blocks = parse("**Budget:** 12.000 €");
        assert_eq!(
            blocks,
            vec![Block::LabelValue {
                label: "Budget".into(),
                value: "12.000 €".into(),
            }]
        );
    }

    #[test]
    fn heading_wins_over_label_value() {
        // Ends with ** → full-bold heading, even though it contains ':'
        let blocks = parse("**Wünsche für den Garten:**");
        assert_eq!(
            blocks,
            vec![Block::Heading("Wünsche für den Garten:".into())]
        );
    }

    #[test]
    fn parse_bullet_line() {
        let blocks = parse("- Terrasse mit Überdachung");
        assert_eq!(blocks, vec![Block::Bullet("Terrasse mit Überdachung".into())]);
    }

    #[test]
    fn parse_paragraph_and_blank() {
        let blocks = parse("Die Familie wohnt seit 2019 dort.\n\nMehr Text");
        assert_eq!(
            blocks,
            vec![
                Block::Paragraph("Die Familie wohnt seit 2019 dort.".into()),
                Block::Blank,
                Block::Paragraph("Mehr Text".into()),
            ]
        );
    }

    #[test]
    fn parse_full_expose() {
        let content = "\
## FAMILIE WEBER AUS DORTMUND

**Familienmitglieder:**
- Thomas Weber, 45, Elektriker

**Budget:** 12.000 €

**Die Familie / Hintergrund:**
Die Familie wohnt seit 2019 im eigenen Haus.";

        let blocks = parse(content);
        assert_eq!(blocks.len(), 9);
        assert!(matches!(blocks[0], Block::Title(_)));
        assert!(matches!(blocks[2], Block::Heading(_)));
        assert!(matches!(blocks[3], Block::Bullet(_)));
        assert!(matches!(blocks[5], Block::LabelValue { .. }));
        assert!(matches!(blocks[8], Block::Paragraph(_)));
    }

    #[test]
    fn malformed_bold_degrades_to_paragraph() {
        let blocks = parse("**unclosed bold");
        assert_eq!(blocks, vec![Block::Paragraph("**unclosed bold".into())]);
    }

    #[test]
    fn bare_double_asterisks_not_a_heading() {
        // "****" has no content between markers
        let blocks = parse("****");
        assert_eq!(blocks, vec![Block::Paragraph("****".into())]);
    }

    #[test]
    fn title_of_finds_headline() {
        let content = "\n\n## FAMILIE KRAUSE AUS JENA\ntext";
        assert_eq!(title_of(content), Some("FAMILIE KRAUSE AUS JENA".into()));
    }

    #[test]
    fn title_of_none_without_headline() {
        assert_eq!(title_of("nur Text\n- und Punkte"), None);
    }

    #[test]
    fn indented_lines_are_trimmed() {
        let blocks = parse("   - eingerückter Punkt");
        assert_eq!(blocks, vec![Block::Bullet("eingerückter Punkt".into())]);
    }
}
