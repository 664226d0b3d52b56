//! Text a front-end shows for a query

use super::{Query, QueryVariant};

/// Help text (when requested), foreword, question, enumerated choices and
/// afterword, one per line
pub(crate) fn render(query: &Query) -> String {
    let mut lines: Vec<String> = Vec::new();

    if query.help_required {
        if let Some(help) = query.help_text.as_deref().or(query.input_tip.as_deref()) {
            lines.push(help.to_string());
        }
    }

    if let Some(foreword) = &query.foreword {
        lines.push(foreword.clone());
    }

    if let Some(question) = &query.question {
        match (query.variant, query.limits.as_slice()) {
            (QueryVariant::Boolean, [yes, no, ..]) => {
                lines.push(format!("{} ({}/{})", question, yes, no));
            }
            _ => lines.push(question.clone()),
        }
    }

    if matches!(
        query.variant,
        QueryVariant::SingleChoice | QueryVariant::MultipleChoice
    ) {
        for (index, choice) in query.limits.iter().enumerate() {
            lines.push(format!("{}) {}", index, choice));
        }
    }

    if let Some(afterword) = &query.afterword {
        lines.push(afterword.clone());
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use crate::locale::Locale;
    use crate::query::Query;
    use crate::values::AspectRatio;

    #[test]
    fn test_choices_are_enumerated() {
        let query = Query::single_choice("engine", "cli")
            .foreword("Layout")
            .question("Which aspect ratio?")
            .afterword("Pick a number or a name.")
            .limits([AspectRatio::Square, AspectRatio::Widescreen])
            .build()
            .unwrap();
        assert_eq!(
            query.display_text(),
            "Layout\nWhich aspect ratio?\n0) 1:1\n1) 16:9\nPick a number or a name."
        );
    }

    #[test]
    fn test_boolean_shows_tokens() {
        let query = Query::boolean("engine", "cli").question("Show diagrams?").build().unwrap();
        assert_eq!(query.display_text(), "Show diagrams? (y/n)");

        let query = Query::boolean("engine", "cli")
            .question("Afficher les diagrammes ?")
            .locale(Locale::Fr)
            .build()
            .unwrap();
        assert_eq!(query.display_text(), "Afficher les diagrammes ? (o/n)");
    }

    #[test]
    fn test_help_shown_after_help_request() {
        let mut query = Query::open("engine", "cli")
            .question("Notes?")
            .help_text("Enter notes like: c d e f g")
            .build()
            .unwrap();
        assert_eq!(query.display_text(), "Notes?");

        let valid = query.reply_to("? what").unwrap();
        assert!(!valid);
        assert!(query.help_required());
        assert_eq!(query.display_text(), "Enter notes like: c d e f g\nNotes?");

        query.reply_to("?").unwrap();
        assert!(!query.help_required());
        assert_eq!(query.display_text(), "Notes?");
    }
}
