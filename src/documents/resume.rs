//! Résumé: a centred header over a narrow contact column and a wide experience column.

use crate::clock::{format_date, format_input_date, Clock};
use crate::fields::FieldValues;
use crate::html::{self, escape, rich};
use crate::model::{
    Column, ColumnWidth, HorizontalAlignment, LayoutDocument, Margin, Node, NodeStyle, Rgb,
};
use crate::registry::DocumentKind;
use crate::richtext::{parse_emphasis, Span};

use super::{
    export_file_name, labelled, section_rule, DocumentVariant, HEADING_COLOR, MUTED_COLOR,
    NOT_SPECIFIED, RULE_WIDTH,
};

const REQUIRED: &[&str] = &["firstName", "lastName", "phone"];

/// Optional body sections of the wide column, in print order.
const BODY_SECTIONS: &[(&str, &str)] = &[
    ("objective", "ПРОФЕСІЙНА МЕТА"),
    ("experience", "ДОСВІД РОБОТИ"),
    ("education", "ОСВІТА"),
    ("languages", "МОВИ"),
    ("additional", "ДОДАТКОВА ІНФОРМАЦІЯ"),
];

const NAME_COLOR: Rgb = Rgb::hex(0x2563eb);
const FOOTER_COLOR: Rgb = Rgb::hex(0x6b7280);
const FOOTER_RULE_COLOR: Rgb = Rgb::hex(0xe5e7eb);

/// A CV built from personal details, experience and skills.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resume {
    fields: FieldValues,
}

impl Resume {
    /// Wraps the submitted résumé fields.
    pub fn new(fields: FieldValues) -> Self {
        Self { fields }
    }

    /// First, optional middle and last name separated by single spaces.
    pub fn full_name(&self) -> String {
        [
            self.fields.text("firstName"),
            self.fields.text("middleName"),
            self.fields.text("lastName"),
        ]
        .iter()
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
    }

    fn birth_date(&self) -> String {
        self.fields
            .get("birthDate")
            .map(format_input_date)
            .unwrap_or_else(|| NOT_SPECIFIED.to_owned())
    }

    /// Label/value pairs of the contact block.
    fn contacts(&self) -> [(&'static str, String); 4] {
        [
            ("Телефон:", self.fields.text("phone").to_owned()),
            ("Email:", self.fields.or("email", NOT_SPECIFIED).to_owned()),
            ("Місто:", self.fields.or("city", NOT_SPECIFIED).to_owned()),
            ("Дата народження:", self.birth_date()),
        ]
    }

    fn contact_column(&self) -> Vec<Node> {
        let mut nodes = vec![Node::plain(
            "КОНТАКТНА ІНФОРМАЦІЯ",
            NodeStyle::named("sectionHeader"),
        )];
        for (index, (label, value)) in self.contacts().iter().enumerate() {
            let style = if index == 0 {
                NodeStyle::new().margin(Margin::top(5.0))
            } else {
                NodeStyle::new()
            };
            nodes.push(Node::text(labelled(label, value), style));
        }

        let skills = self.fields.lines("skills");
        if !skills.is_empty() {
            nodes.push(Node::plain(
                "НАВИЧКИ",
                NodeStyle::named("sectionHeader").margin(Margin::top(15.0)),
            ));
            nodes.push(Node::unordered_list(
                skills.into_iter().map(parse_emphasis).collect(),
                NodeStyle::new().margin(Margin::top(5.0)),
            ));
        }
        nodes
    }

    fn body_column(&self) -> Vec<Node> {
        let mut nodes = Vec::new();
        for (field, title) in BODY_SECTIONS {
            let Some(value) = self.fields.get(field) else {
                continue;
            };
            nodes.push(Node::plain(
                *title,
                NodeStyle::named("sectionHeader")
                    .margin(Margin::bottom(5.0))
                    .underlined(super::RULE_COLOR),
            ));
            nodes.push(Node::text(
                parse_emphasis(value),
                NodeStyle::named("bodyText").margin(Margin::bottom(10.0)),
            ));
        }
        nodes
    }

    fn html_body_sections(&self) -> String {
        BODY_SECTIONS
            .iter()
            .filter_map(|(field, title)| {
                self.fields.get(field).map(|value| {
                    format!(
                        r#"<div class="mb-6"><h3 class="font-bold text-lg mb-3 text-gray-800 border-b border-gray-300 pb-1">{}</h3><div class="text-sm text-gray-700 leading-relaxed whitespace-pre-line">{}</div></div>"#,
                        title,
                        rich(value)
                    )
                })
            })
            .collect()
    }

    fn html_skills(&self) -> String {
        let skills = self.fields.lines("skills");
        if skills.is_empty() {
            return String::new();
        }
        format!(
            r#"<div class="bg-gray-50 p-4 rounded-lg mt-4"><h3 class="font-bold text-lg mb-3 text-gray-800">НАВИЧКИ</h3><div class="text-sm">{}</div></div>"#,
            html::line_blocks(&skills, "mb-1", |_| "• ".to_owned())
        )
    }
}

impl DocumentVariant for Resume {
    fn kind(&self) -> DocumentKind {
        DocumentKind::Resume
    }

    fn fields(&self) -> &FieldValues {
        &self.fields
    }

    fn required_fields(&self) -> &'static [&'static str] {
        REQUIRED
    }

    fn render_html(&self, clock: &dyn Clock) -> String {
        let contacts: String = self
            .contacts()
            .iter()
            .map(|(label, value)| {
                format!("<div><strong>{}</strong> {}</div>", label, escape(value))
            })
            .collect();

        format!(
            concat!(
                r#"<div class="max-w-4xl mx-auto bg-white p-8 font-['Times_New_Roman']">"#,
                r#"<div class="text-center border-b-2 border-gray-300 pb-6 mb-6">"#,
                r#"<h1 class="text-3xl font-bold text-gray-800 mb-2">РЕЗЮМЕ</h1>"#,
                r#"<div class="text-xl font-semibold text-blue-600">{name}</div>"#,
                r#"<div class="text-lg text-gray-600 mt-1">{position}</div>"#,
                r#"</div>"#,
                r#"<div class="grid md:grid-cols-3 gap-8">"#,
                r#"<div class="md:col-span-1">"#,
                r#"<div class="bg-gray-50 p-4 rounded-lg">"#,
                r#"<h3 class="font-bold text-lg mb-3 text-gray-800">КОНТАКТНА ІНФОРМАЦІЯ</h3>"#,
                r#"<div class="space-y-2 text-sm">{contacts}</div>"#,
                r#"</div>{skills}</div>"#,
                r#"<div class="md:col-span-2">{sections}</div>"#,
                r#"</div>"#,
                r#"<div class="text-right text-xs text-gray-500 mt-8 pt-4 border-t border-gray-200">Створено: {date}</div>"#,
                r#"</div>"#,
            ),
            name = escape(&self.full_name()),
            position = escape(self.fields.or("position", NOT_SPECIFIED)),
            contacts = contacts,
            skills = self.html_skills(),
            sections = self.html_body_sections(),
            date = format_date(clock.today()),
        )
    }

    fn print_layout(&self, clock: &dyn Clock) -> LayoutDocument {
        log::debug!("Building résumé layout for {}", self.full_name());

        let content = vec![
            Node::plain(
                "РЕЗЮМЕ",
                NodeStyle::named("header").aligned(HorizontalAlignment::Center),
            ),
            Node::plain(
                self.full_name(),
                NodeStyle::named("subheader")
                    .aligned(HorizontalAlignment::Center)
                    .color(NAME_COLOR),
            ),
            Node::plain(
                self.fields.or("position", NOT_SPECIFIED),
                NodeStyle::named("subsubheader")
                    .aligned(HorizontalAlignment::Center)
                    .margin(Margin::vertical(5.0, 15.0)),
            ),
            section_rule(20.0),
            Node::columns(
                vec![
                    Column::new(ColumnWidth::Percent(30.0), self.contact_column()),
                    Column::new(ColumnWidth::Percent(70.0), self.body_column()),
                ],
                20.0,
                NodeStyle::new().margin(Margin::top(20.0)),
            ),
            Node::rule(
                RULE_WIDTH,
                FOOTER_RULE_COLOR,
                NodeStyle::new().margin(Margin::bottom(10.0)),
            ),
            Node::text(
                vec![Span::new(format!("Створено: {}", format_date(clock.today())))],
                NodeStyle::new()
                    .aligned(HorizontalAlignment::Right)
                    .font_size(8.0)
                    .color(FOOTER_COLOR)
                    .margin(Margin::top(30.0)),
            ),
        ];

        LayoutDocument::new(content)
            .with_style(
                "header",
                NodeStyle::new()
                    .font_size(24.0)
                    .bold()
                    .color(HEADING_COLOR)
                    .margin(Margin::bottom(10.0)),
            )
            .with_style(
                "subheader",
                NodeStyle::new()
                    .font_size(18.0)
                    .bold()
                    .margin(Margin::top(5.0)),
            )
            .with_style(
                "subsubheader",
                NodeStyle::new().font_size(14.0).color(MUTED_COLOR),
            )
            .with_style(
                "sectionHeader",
                NodeStyle::new()
                    .font_size(12.0)
                    .bold()
                    .color(HEADING_COLOR)
                    .margin(Margin::bottom(10.0)),
            )
            .with_style(
                "bodyText",
                NodeStyle::new()
                    .font_size(10.0)
                    .color(MUTED_COLOR)
                    .line_height(1.5),
            )
    }

    fn export_file_name(&self) -> String {
        export_file_name(
            "Резюме",
            &[self.fields.text("firstName"), self.fields.text("lastName")],
            None,
        )
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::clock::FixedClock;

    fn clock() -> FixedClock {
        FixedClock(NaiveDate::from_ymd_opt(2024, 3, 8).expect("valid date"))
    }

    fn minimal() -> FieldValues {
        FieldValues::new()
            .with("firstName", "A")
            .with("lastName", "B")
            .with("phone", "C")
    }

    #[test]
    fn validate_requires_name_and_phone() {
        assert!(Resume::new(minimal()).validate());
        for missing in REQUIRED {
            let fields: FieldValues = minimal()
                .iter()
                .filter(|(name, _)| name != missing)
                .map(|(name, value)| (name.to_owned(), value.to_owned()))
                .collect();
            let resume = Resume::new(fields.with("email", "a@b.c"));
            assert!(!resume.validate(), "{} should be required", missing);
            assert_eq!(resume.missing_fields(), vec![*missing]);
        }
    }

    #[test]
    fn full_name_skips_missing_middle_name() {
        assert_eq!(Resume::new(minimal()).full_name(), "A B");
        assert_eq!(
            Resume::new(minimal().with("middleName", "M")).full_name(),
            "A M B"
        );
    }

    #[test]
    fn html_uses_placeholders_and_omits_empty_sections() {
        let html = Resume::new(minimal()).render_html(&clock());
        assert!(html.contains("<strong>Email:</strong> Не вказано"));
        assert!(html.contains("Створено: 08.03.2024"));
        assert!(!html.contains("НАВИЧКИ"));
        assert!(!html.contains("ПРОФЕСІЙНА МЕТА"));
    }

    #[test]
    fn skills_become_trimmed_bullets() {
        let resume = Resume::new(minimal().with("skills", " Rust \nSQL"));
        let html = resume.render_html(&clock());
        assert!(html.contains(r#"<div class="mb-1">• Rust</div><div class="mb-1">• SQL</div>"#));

        let layout = resume.print_layout(&clock());
        assert!(layout.any(
            |node| matches!(node, Node::UnorderedList(list) if list.items.len() == 2)
        ));
    }

    #[test]
    fn layout_formats_body_emphasis() {
        let layout =
            Resume::new(minimal().with("objective", "Лідер **команди**")).print_layout(&clock());
        let body = layout
            .nodes()
            .into_iter()
            .find_map(|node| match node {
                Node::Text(text) if text.style.style.as_deref() == Some("bodyText") => Some(text),
                _ => None,
            })
            .expect("objective body");
        assert_eq!(body.spans, vec![Span::new("Лідер "), Span::new("команди").bold()]);
        assert_eq!(layout.default_style.font, "TimesNewRoman");
    }

    #[test]
    fn export_name_uses_first_and_last_name() {
        let resume = Resume::new(minimal().with("firstName", "Олена Марія"));
        assert_eq!(resume.export_file_name(), "Резюме_Олена_Марія_B.pdf");
    }
}
