use serde::Serialize;

use crate::cli::OutputFormat;

/// Render a view as JSON or through its text renderer.
pub fn render<T: Serialize>(
    value: &T,
    format: OutputFormat,
    text: impl FnOnce(&T) -> Vec<String>,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Text => Ok(text(value).join("\n")),
    }
}

/// Print a view in the requested format.
pub fn output<T: Serialize>(
    value: &T,
    format: OutputFormat,
    text: impl FnOnce(&T) -> Vec<String>,
) -> anyhow::Result<()> {
    let rendered = render(value, format, text)?;
    println!("{rendered}");
    Ok(())
}

#[must_use]
pub fn rupees(amount: u64) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("₹{grouped}")
}

/// Text progress bar, `width` cells wide.
#[must_use]
pub fn bar(percent: f64, width: usize) -> String {
    let percent = percent.clamp(0.0, 100.0);
    // clamped to 0..=width
    let filled = ((percent / 100.0) * width as f64).round() as usize;
    format!("{}{}", "#".repeat(filled), ".".repeat(width - filled))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde::Serialize;

    use super::*;

    #[derive(Serialize)]
    struct Row {
        name: &'static str,
        points: u32,
    }

    #[test]
    fn json_and_text_render_the_same_view() {
        let row = Row {
            name: "Davis Curtis",
            points: 2569,
        };
        let json = render(&row, OutputFormat::Json, |_| Vec::new()).unwrap();
        assert!(json.contains("\"points\": 2569"));

        let text = render(&row, OutputFormat::Text, |r| {
            vec![r.name.to_owned(), r.points.to_string()]
        })
        .unwrap();
        assert_eq!(text, "Davis Curtis\n2569");
    }

    #[test]
    fn amounts_are_grouped_in_thousands() {
        assert_eq!(rupees(0), "₹0");
        assert_eq!(rupees(999), "₹999");
        assert_eq!(rupees(4829), "₹4,829");
        assert_eq!(rupees(1_250_000), "₹1,250,000");
    }

    #[test]
    fn bars_clamp() {
        assert_eq!(bar(50.0, 10), "#####.....");
        assert_eq!(bar(150.0, 4), "####");
        assert_eq!(bar(-3.0, 4), "....");
    }
}
