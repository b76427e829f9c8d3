//! The exposé extraction prompt and its combination rules.
//!
//! The prompt is German because the Casting-Bögen and the produced exposés
//! are German. The structure below is the one redactions expect: family
//! headline, members, garden facts, budget, wishes, background, notes.

/// Core extraction instruction sent with every request.
pub const EXTRACTION_PROMPT: &str = "\
Analysiere die folgenden Casting-Unterlagen und extrahiere die wichtigsten Informationen.

Erstelle daraus ein kompaktes Exposé mit folgender Struktur:

## FAMILIENNAME AUS ORT

**Familienmitglieder:**
(Name, Alter, Beruf - für jede Person)

**Fakten zum Garten:**
- Größe
- Besonderheiten (Zugang, Haustyp etc.)

**Budget:** X €

**Wünsche für den Garten:**
- (Aufzählung der wichtigsten Wünsche, kurz und prägnant)

**Die Familie / Hintergrund:**
(2-3 Sätze zur Familie und warum sie den Garten umgestalten wollen. Interessante Details hervorheben.)

**Besonderheiten / Notizen:**
(Falls relevant: TV-Erfahrung, Termine, Einschränkungen)

WICHTIG:
- Schreibe auf Deutsch
- Fasse dich kurz und prägnant
- Nur relevante, interessante Informationen
- Ignoriere Datenschutzerklärungen und rechtliche Texte
- Das Exposé soll auf eine Seite passen";

/// Assemble the user prompt from the available sources.
///
/// Mirrors the three upload situations: text only, images only, and the
/// combined case where the text block is introduced before the images.
pub fn build_prompt(text: Option<&str>, has_images: bool) -> String {
    let text = text.filter(|t| !t.trim().is_empty());

    match (text, has_images) {
        (Some(text), true) => format!(
            "{EXTRACTION_PROMPT}\n\nHier sind die Unterlagen:\n\nTEXTUELLE INFORMATIONEN:\n{text}\n\nGESCANNTE DOKUMENTE/BILDER:"
        ),
        (Some(text), false) => {
            format!("{EXTRACTION_PROMPT}\n\nHier sind die Unterlagen:\n\n{text}")
        }
        (None, _) => EXTRACTION_PROMPT.to_string(),
    }
}
