//! Structural editing of the agent prompt.
//!
//! The prompt is free text owned by the operator, but this integration adds
//! and removes one fixed section. To avoid fragile pattern matching against
//! operator-edited text, the prompt is parsed into an ordered list of
//! sections (a `## ` heading plus its body) and edited structurally.

/// Sentinel heading that marks the section this integration owns.
pub const AGENDA_HEADING: &str = "## Gestión de Agenda";

/// The instructional section appended to the agent prompt on registration.
const AGENDA_SECTION: &str = "\
## Gestión de Agenda

Dispones de herramientas para gestionar la agenda del negocio:

- Usa `consultar_agenda` cuando la persona pregunte por disponibilidad u horarios libres.
- Usa `agendar_cita` para crear una cita nueva, solo después de confirmar motivo, fecha, hora de inicio y hora de fin.
- Usa `reagendar_cita` cuando una cita existente deba moverse; identifícala por el nombre con el que se agendó.
- Usa `cancelar_cita` cuando la persona quiera cancelar; confirma nombre y fecha antes de hacerlo.

Las horas se manejan en formato de 24 horas (HH:MM). Confirma siempre los datos en voz alta antes de ejecutar una herramienta.";

/// One prompt section: an optional `## ` heading line and the lines under it.
/// The text before the first heading is a section with no heading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub heading: Option<String>,
    pub body: Vec<String>,
}

/// Parse a prompt into ordered sections. Lossless up to a trailing newline.
pub fn parse_sections(text: &str) -> Vec<Section> {
    let mut sections: Vec<Section> = Vec::new();
    let mut current = Section {
        heading: None,
        body: Vec::new(),
    };
    let mut preamble_started = false;

    for line in text.lines() {
        if line.trim_end().starts_with("## ") {
            if preamble_started || current.heading.is_some() {
                sections.push(current);
            }
            current = Section {
                heading: Some(line.trim_end().to_string()),
                body: Vec::new(),
            };
        } else {
            preamble_started = true;
            current.body.push(line.to_string());
        }
    }
    if preamble_started || current.heading.is_some() {
        sections.push(current);
    }

    sections
}

/// Render sections back to flat text.
pub fn render_sections(sections: &[Section]) -> String {
    let mut lines: Vec<&str> = Vec::new();
    for section in sections {
        if let Some(ref heading) = section.heading {
            lines.push(heading);
        }
        for line in &section.body {
            lines.push(line);
        }
    }
    lines.join("\n")
}

fn has_agenda_section(sections: &[Section]) -> bool {
    sections
        .iter()
        .any(|s| s.heading.as_deref().map(str::trim) == Some(AGENDA_HEADING))
}

/// Append the agenda section unless the sentinel heading is already present.
pub fn append_agenda_section(prompt: &str) -> String {
    let sections = parse_sections(prompt);
    if has_agenda_section(&sections) {
        return prompt.to_string();
    }

    let trimmed = prompt.trim_end();
    if trimmed.is_empty() {
        AGENDA_SECTION.to_string()
    } else {
        format!("{trimmed}\n\n{AGENDA_SECTION}")
    }
}

/// Remove the agenda section, leaving every other section untouched.
/// A prompt without the section is returned as-is.
pub fn remove_agenda_section(prompt: &str) -> String {
    let sections = parse_sections(prompt);
    if !has_agenda_section(&sections) {
        return prompt.to_string();
    }

    let kept: Vec<Section> = sections
        .into_iter()
        .filter(|s| s.heading.as_deref().map(str::trim) != Some(AGENDA_HEADING))
        .collect();

    render_sections(&kept).trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_is_idempotent() {
        let once = append_agenda_section("Be polite.");
        let twice = append_agenda_section(&once);

        assert_eq!(once, twice);
        assert_eq!(once.matches(AGENDA_HEADING).count(), 1);
        assert!(once.starts_with("Be polite.\n\n## Gestión de Agenda"));
    }

    #[test]
    fn test_append_to_empty_prompt() {
        let result = append_agenda_section("");
        assert!(result.starts_with(AGENDA_HEADING));
    }

    #[test]
    fn test_remove_round_trip() {
        let original = "Be polite.\n\n## Horario\nAbierto de 9 a 18.";
        let with_section = append_agenda_section(original);
        let removed = remove_agenda_section(&with_section);

        assert_eq!(removed, original);
    }

    #[test]
    fn test_remove_only_touches_agenda_section() {
        let prompt = "Intro text.\n\n## Gestión de Agenda\n\nInstrucciones.\n\n## Despedida\nDespídete con amabilidad.";
        let removed = remove_agenda_section(prompt);

        assert!(!removed.contains(AGENDA_HEADING));
        assert!(removed.contains("Intro text."));
        assert!(removed.contains("## Despedida"));
        assert!(removed.contains("Despídete con amabilidad."));
    }

    #[test]
    fn test_remove_without_section_is_noop() {
        let prompt = "Just a prompt.";
        assert_eq!(remove_agenda_section(prompt), prompt);
    }

    #[test]
    fn test_parse_preserves_section_order() {
        let prompt = "pre\n## A\na body\n## B\nb body";
        let sections = parse_sections(prompt);

        assert_eq!(sections.len(), 3);
        assert_eq!(sections[0].heading, None);
        assert_eq!(sections[1].heading.as_deref(), Some("## A"));
        assert_eq!(sections[2].heading.as_deref(), Some("## B"));
        assert_eq!(render_sections(&sections), prompt);
    }
}
