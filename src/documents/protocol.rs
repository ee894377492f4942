//! Meeting protocol: metadata, attendance, agenda, discussion and resolutions.

use crate::clock::{format_input_date, Clock};
use crate::fields::FieldValues;
use crate::html::{self, escape, rich};
use crate::model::{
    Column, ColumnWidth, HorizontalAlignment, LayoutDocument, Margin, Node, NodeStyle,
};
use crate::registry::DocumentKind;
use crate::richtext::parse_emphasis;

use super::{
    export_file_name, labelled, section_rule, DocumentVariant, HEADING_COLOR, MUTED_COLOR,
    NOT_SPECIFIED, SIGNATURE_COLOR,
};

const REQUIRED: &[&str] = &["meetingType", "date", "participants"];

const SIGNATURE_RULE_WIDTH: f32 = 140.0;

/// How the body of an optional section is presented.
#[derive(Clone, Copy)]
enum SectionBody {
    /// One numbered entry per line.
    Numbered,
    /// Free text.
    Prose,
}

/// Optional sections after the attendance block, in print order.
const SECTIONS: &[(&str, &str, SectionBody)] = &[
    ("agenda", "ПОРЯДОК ДЕННИЙ:", SectionBody::Numbered),
    ("discussion", "ОБГОВОРЕННЯ ТА РІШЕННЯ:", SectionBody::Prose),
    ("decisions", "УХВАЛЕНО:", SectionBody::Numbered),
];

/// Minutes of a meeting, signed by its chairman and secretary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Protocol {
    fields: FieldValues,
}

impl Protocol {
    /// Wraps the submitted protocol fields.
    pub fn new(fields: FieldValues) -> Self {
        Self { fields }
    }

    /// The meeting date as printed, or an empty string when missing.
    pub fn meeting_date(&self) -> String {
        self.fields
            .get("date")
            .map(format_input_date)
            .unwrap_or_default()
    }

    fn details(&self) -> [(&'static str, String); 4] {
        [
            (
                "№ протоколу:",
                self.fields.or("protocolNumber", NOT_SPECIFIED).to_owned(),
            ),
            ("Дата проведення:", self.meeting_date()),
            (
                "Час проведення:",
                self.fields.or("time", NOT_SPECIFIED).to_owned(),
            ),
            (
                "Місце проведення:",
                self.fields.or("location", NOT_SPECIFIED).to_owned(),
            ),
        ]
    }

    fn officials(&self) -> [(&'static str, &str); 2] {
        [
            ("Голова зустрічі:", self.fields.or("chairman", NOT_SPECIFIED)),
            ("Секретар:", self.fields.or("secretary", NOT_SPECIFIED)),
        ]
    }

    fn signatories(&self) -> [(&'static str, &str); 2] {
        [
            ("Голова зустрічі:", self.fields.text("chairman")),
            ("Секретар:", self.fields.text("secretary")),
        ]
    }

    fn section_header(title: &str) -> [Node; 2] {
        [
            Node::plain(
                title,
                NodeStyle::named("sectionHeader").margin(Margin::bottom(5.0)),
            ),
            section_rule(10.0),
        ]
    }

    fn signature_column(label: &str, name: &str) -> Column {
        Column::new(
            ColumnWidth::Percent(50.0),
            vec![Node::stack(
                vec![
                    Node::plain(label, NodeStyle::new().font_size(10.0)),
                    Node::text(parse_emphasis(name), NodeStyle::new()),
                    Node::rule(SIGNATURE_RULE_WIDTH, SIGNATURE_COLOR, NodeStyle::new()),
                ],
                NodeStyle::new(),
            )],
        )
    }
}

fn label_rows(rows: &[(&str, &str)]) -> String {
    rows.iter()
        .map(|(label, value)| format!("<div><strong>{}</strong> {}</div>", label, escape(value)))
        .collect()
}

impl DocumentVariant for Protocol {
    fn kind(&self) -> DocumentKind {
        DocumentKind::Protocol
    }

    fn fields(&self) -> &FieldValues {
        &self.fields
    }

    fn required_fields(&self) -> &'static [&'static str] {
        REQUIRED
    }

    fn render_html(&self, _clock: &dyn Clock) -> String {
        let details = self.details();
        let details: Vec<(&str, &str)> = details
            .iter()
            .map(|(label, value)| (*label, value.as_str()))
            .collect();

        let participants = self.fields.lines("participants");

        let sections: String = SECTIONS
            .iter()
            .filter_map(|(field, title, body)| {
                let value = self.fields.get(field)?;
                let inner = match body {
                    SectionBody::Numbered => {
                        let class = if *field == "decisions" { "mb-3" } else { "mb-2" };
                        html::numbered_blocks(&self.fields.lines(field), class)
                    }
                    SectionBody::Prose => format!(
                        r#"<div class="whitespace-pre-line">{}</div>"#,
                        rich(value)
                    ),
                };
                Some(format!(
                    r#"<div class="mb-8"><h3 class="text-lg font-bold mb-3 border-b border-gray-300 pb-1">{}</h3><div class="text-sm leading-relaxed">{}</div></div>"#,
                    title, inner
                ))
            })
            .collect();

        let signatures: String = self
            .signatories()
            .iter()
            .map(|(label, name)| {
                let name = if name.is_empty() {
                    "&nbsp;".to_owned()
                } else {
                    rich(name)
                };
                format!(
                    r#"<div class="text-sm"><div>{}</div><div class="w-48 border-b border-gray-400 pb-1">{}</div></div>"#,
                    label, name
                )
            })
            .collect();

        format!(
            concat!(
                r#"<div class="max-w-4xl mx-auto bg-white p-8 font-['Times_New_Roman']">"#,
                r#"<div class="text-center mb-8">"#,
                r#"<h1 class="text-xl font-bold mb-2">ПРОТОКОЛ</h1>"#,
                r#"<div class="text-lg">{meeting_type}</div>"#,
                r#"</div>"#,
                r#"<div class="grid md:grid-cols-2 gap-8 mb-8">"#,
                r#"<div class="text-sm space-y-2">{details}</div>"#,
                r#"<div class="text-sm space-y-2">{officials}</div>"#,
                r#"</div>"#,
                r#"<div class="mb-8">"#,
                r#"<h3 class="text-lg font-bold mb-3 border-b border-gray-300 pb-1">ПРИСУТНІ:</h3>"#,
                r#"<div class="text-sm leading-relaxed">{participants}</div>"#,
                r#"</div>"#,
                r#"{sections}"#,
                r#"<div class="mt-12 grid md:grid-cols-2 gap-8">{signatures}</div>"#,
                r#"</div>"#,
            ),
            meeting_type = escape(self.fields.text("meetingType")),
            details = label_rows(&details),
            officials = label_rows(&self.officials()),
            participants = html::line_blocks(&participants, "mb-1", |_| String::new()),
            sections = sections,
            signatures = signatures,
        )
    }

    fn print_layout(&self, _clock: &dyn Clock) -> LayoutDocument {
        log::debug!(
            "Building protocol layout for '{}' on {}",
            self.fields.text("meetingType"),
            self.meeting_date()
        );

        let metadata = |rows: Vec<Node>| {
            Column::new(
                ColumnWidth::Percent(50.0),
                vec![Node::stack(rows, NodeStyle::new())],
            )
        };
        let details = self
            .details()
            .iter()
            .map(|(label, value)| Node::text(labelled(label, value), NodeStyle::new()))
            .collect();
        let officials = self
            .officials()
            .iter()
            .map(|(label, value)| Node::text(labelled(label, value), NodeStyle::new()))
            .collect();

        let mut content = vec![
            Node::plain(
                "ПРОТОКОЛ",
                NodeStyle::named("header")
                    .aligned(HorizontalAlignment::Center)
                    .margin(Margin::bottom(5.0)),
            ),
            Node::plain(
                self.fields.text("meetingType"),
                NodeStyle::named("subheader")
                    .aligned(HorizontalAlignment::Center)
                    .margin(Margin::bottom(20.0)),
            ),
            Node::columns(
                vec![metadata(details), metadata(officials)],
                20.0,
                NodeStyle::new()
                    .font_size(10.0)
                    .margin(Margin::bottom(20.0)),
            ),
        ];

        content.extend(Self::section_header("ПРИСУТНІ:"));
        content.push(Node::stack(
            self.fields
                .lines("participants")
                .into_iter()
                .map(|participant| Node::text(parse_emphasis(participant), NodeStyle::new()))
                .collect::<Vec<_>>(),
            NodeStyle::new()
                .font_size(10.0)
                .line_height(1.5)
                .margin(Margin::bottom(20.0)),
        ));

        for (field, title, body) in SECTIONS {
            let Some(value) = self.fields.get(field) else {
                continue;
            };
            content.extend(Self::section_header(title));
            content.push(match body {
                SectionBody::Numbered => Node::ordered_list(
                    self.fields
                        .lines(field)
                        .into_iter()
                        .map(parse_emphasis)
                        .collect(),
                    NodeStyle::new()
                        .font_size(10.0)
                        .margin(Margin::bottom(20.0)),
                ),
                SectionBody::Prose => Node::text(
                    parse_emphasis(value),
                    NodeStyle::new()
                        .font_size(10.0)
                        .aligned(HorizontalAlignment::Justify)
                        .line_height(1.5)
                        .margin(Margin::bottom(20.0)),
                ),
            });
        }

        let [chairman, secretary] = self.signatories();
        content.push(Node::columns(
            vec![
                Self::signature_column(chairman.0, chairman.1),
                Self::signature_column(secretary.0, secretary.1),
            ],
            20.0,
            NodeStyle::new().margin(Margin::top(40.0)),
        ));

        LayoutDocument::new(content)
            .with_style(
                "header",
                NodeStyle::new()
                    .font_size(18.0)
                    .bold()
                    .color(HEADING_COLOR),
            )
            .with_style(
                "subheader",
                NodeStyle::new().font_size(14.0).color(MUTED_COLOR),
            )
            .with_style(
                "sectionHeader",
                NodeStyle::new()
                    .font_size(12.0)
                    .bold()
                    .color(HEADING_COLOR),
            )
    }

    fn export_file_name(&self) -> String {
        export_file_name(
            "Протокол",
            &[self.fields.text("protocolNumber")],
            self.fields.get("date"),
        )
    }
}
