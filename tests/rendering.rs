use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, OnceLock};

use chrono::NaiveDate;
use document_builder::fonts::{self, FONTS_DIR_ENV, FONT_FILE_SETS, SYSTEM_FONTS_DIR_ENV};
use document_builder::model::{Dash, Node, NodeStyle, PlaceholderBox, Rgb, RuleNode, TextNode};
use document_builder::richtext::Span;
use document_builder::{
    create_document, DocumentVariant, FieldValues, FixedClock, LayoutDocument, PdfBuildError,
    PdfBuilder,
};
use sha2::{Digest, Sha256};
use tempfile::TempDir;

static FONT_ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
static SUBSTITUTE_FONTS: OnceLock<Option<TempDir>> = OnceLock::new();

/// Serif families with Cyrillic coverage that stand in for Times New Roman on test machines.
const SUBSTITUTE_FACES: &[(&str, [&str; 4])] = &[
    (
        "/usr/share/fonts/truetype/liberation",
        [
            "LiberationSerif-Regular.ttf",
            "LiberationSerif-Bold.ttf",
            "LiberationSerif-Italic.ttf",
            "LiberationSerif-BoldItalic.ttf",
        ],
    ),
    (
        "/usr/share/fonts/truetype/dejavu",
        [
            "DejaVuSerif.ttf",
            "DejaVuSerif-Bold.ttf",
            "DejaVuSerif-Italic.ttf",
            "DejaVuSerif-BoldItalic.ttf",
        ],
    ),
    (
        "/usr/share/fonts/dejavu",
        [
            "DejaVuSerif.ttf",
            "DejaVuSerif-Bold.ttf",
            "DejaVuSerif-Italic.ttf",
            "DejaVuSerif-BoldItalic.ttf",
        ],
    ),
];

fn font_env_lock() -> MutexGuard<'static, ()> {
    FONT_ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Sets an environment variable until dropped.
struct EnvOverride {
    name: &'static str,
    original: Option<OsString>,
}

impl EnvOverride {
    fn set(name: &'static str, value: impl AsRef<Path>) -> Self {
        let original = env::var_os(name);
        env::set_var(name, value.as_ref());
        Self { name, original }
    }
}

impl Drop for EnvOverride {
    fn drop(&mut self) {
        match self.original.take() {
            Some(value) => env::set_var(self.name, value),
            None => env::remove_var(self.name),
        }
    }
}

/// Points both font lookups at directories that do not exist for the guard's lifetime.
struct FontSearchGuard {
    _fonts: EnvOverride,
    _system_fonts: EnvOverride,
    _lock: MutexGuard<'static, ()>,
}

impl FontSearchGuard {
    fn isolate() -> Self {
        let lock = font_env_lock();
        Self {
            _fonts: EnvOverride::set(FONTS_DIR_ENV, "/__document_builder_missing_fonts__"),
            _system_fonts: EnvOverride::set(
                SYSTEM_FONTS_DIR_ENV,
                "/__document_builder_missing_system_fonts__",
            ),
            _lock: lock,
        }
    }
}

/// Copies the first installed substitute family into a directory under the bundled names.
fn substitute_fonts() -> Option<PathBuf> {
    SUBSTITUTE_FONTS
        .get_or_init(|| {
            let (source, faces) = SUBSTITUTE_FACES.iter().find(|(directory, faces)| {
                faces.iter().all(|face| Path::new(directory).join(face).is_file())
            })?;
            let target = tempfile::tempdir().ok()?;
            let bundled = &FONT_FILE_SETS[0];
            let names = [bundled.regular, bundled.bold, bundled.italic, bundled.bold_italic];
            for (face, name) in faces.iter().zip(names) {
                fs::copy(Path::new(source).join(face), target.path().join(name)).ok()?;
            }
            Some(target)
        })
        .as_ref()
        .map(|dir| dir.path().to_path_buf())
}

/// Runs `render` with a usable font directory, or returns `None` when the machine has none.
fn with_fonts<T>(what: &str, render: impl FnOnce() -> T) -> Option<T> {
    let _lock = font_env_lock();
    if fonts::fonts_available() {
        return Some(render());
    }

    let Some(directory) = substitute_fonts() else {
        eprintln!(
            "Skipping {what}: no Times New Roman or substitute fonts. Set {FONTS_DIR_ENV}."
        );
        return None;
    };
    let _fonts = EnvOverride::set(FONTS_DIR_ENV, directory);
    Some(render())
}

fn sample_layout(tag: &str) -> LayoutDocument {
    let raw = match tag {
        "cv" => include_str!("../demos/cv.json"),
        "letter" => include_str!("../demos/letter.json"),
        _ => include_str!("../demos/protocol.json"),
    };
    let fields = FieldValues::from_json(raw).expect("demo input");
    let clock = FixedClock(NaiveDate::from_ymd_opt(2024, 6, 20).expect("valid date"));
    create_document(tag, fields)
        .expect("registered tag")
        .print_layout(&clock)
}

fn render_layout(what: &str, layout: &LayoutDocument) -> Option<Vec<u8>> {
    with_fonts(what, || {
        PdfBuilder::new()
            .with_title("Sample")
            .render(layout)
            .unwrap_or_else(|err| panic!("render {what}: {err}"))
            .bytes
    })
}

fn render_sample_pdf(tag: &str) -> Option<Vec<u8>> {
    render_layout(tag, &sample_layout(tag))
}

fn decorations(rule_thickness: f32) -> LayoutDocument {
    LayoutDocument::new(vec![
        Node::Rule(RuleNode {
            length: 520.0,
            thickness: rule_thickness,
            color: Rgb::hex(0x1f2937),
            style: NodeStyle::new(),
        }),
        Node::PlaceholderBox(PlaceholderBox {
            width: 120.0,
            height: 60.0,
            color: Rgb::hex(0x9ca3af),
            dash: Some(Dash {
                length: 4.0,
                space: 2.0,
            }),
            label: TextNode {
                spans: vec![Span::new("М.П.")],
                style: NodeStyle::new().font_size(9.0),
            },
            style: NodeStyle::new(),
        }),
        Node::plain("Підпис", NodeStyle::new().underlined(Rgb::hex(0x000000))),
    ])
}

fn scrub_pdf(bytes: &[u8]) -> Vec<u8> {
    fn scrub_segment(data: &mut [u8], tag: &[u8], terminator: u8) {
        let mut index = 0;
        while index + tag.len() < data.len() {
            if data[index..].starts_with(tag) {
                let mut cursor = index + tag.len();
                while cursor < data.len() {
                    let byte = data[cursor];
                    if byte == terminator {
                        break;
                    }
                    if terminator == b')' {
                        data[cursor] = b'0';
                    } else if !matches!(byte, b'<' | b'>' | b' ' | b'\n' | b'\r' | b'\t') {
                        data[cursor] = b'0';
                    }
                    cursor += 1;
                }
                index = cursor;
            } else {
                index += 1;
            }
        }
    }

    fn scrub_xml(data: &mut [u8], start: &[u8], end: &[u8]) {
        let mut offset = 0;
        while offset + start.len() < data.len() {
            let Some(start_pos) = data[offset..]
                .windows(start.len())
                .position(|window| window == start)
            else {
                break;
            };
            let start_index = offset + start_pos + start.len();
            let Some(end_pos) = data[start_index..]
                .windows(end.len())
                .position(|window| window == end)
            else {
                break;
            };
            for byte in &mut data[start_index..start_index + end_pos] {
                if !matches!(*byte, b'<' | b'>' | b'/' | b' ' | b'\n' | b'\r' | b'\t') {
                    *byte = b'0';
                }
            }
            offset = start_index + end_pos + end.len();
        }
    }

    let mut normalized = bytes.to_vec();
    let segments: [(&[u8], u8); 4] = [
        (b"/CreationDate(", b')'),
        (b"/ModDate(", b')'),
        (b"/ID[", b']'),
        (b"/Producer(", b')'),
    ];
    for (tag, terminator) in segments {
        scrub_segment(&mut normalized, tag, terminator);
    }
    for element in [
        "xmp:CreateDate",
        "xmp:ModifyDate",
        "xmp:MetadataDate",
        "xmpMM:DocumentID",
        "xmpMM:InstanceID",
        "xmpMM:VersionID",
    ] {
        let start = format!("<{element}>");
        let end = format!("</{element}>");
        scrub_xml(&mut normalized, start.as_bytes(), end.as_bytes());
    }
    normalized
}

fn normalized_hash(bytes: &[u8]) -> [u8; 32] {
    let normalized = scrub_pdf(bytes);
    let digest = Sha256::digest(&normalized);
    digest.into()
}

#[test]
fn renders_every_document_type() {
    for tag in ["cv", "letter", "protocol"] {
        let Some(bytes) = render_sample_pdf(tag) else {
            return;
        };
        assert!(bytes.starts_with(b"%PDF"), "{tag} output should be a PDF");
    }
}

#[test]
fn renders_rules_placeholders_and_underlines() {
    let Some(thin) = render_layout("thin rule", &decorations(1.0)) else {
        return;
    };
    let Some(thick) = render_layout("thick rule", &decorations(4.0)) else {
        return;
    };

    assert!(thin.starts_with(b"%PDF"));
    assert!(thick.starts_with(b"%PDF"));
    assert_ne!(
        normalized_hash(&thin),
        normalized_hash(&thick),
        "a thicker rule should add strokes"
    );
}

#[test]
fn rendering_is_deterministic() {
    let Some(bytes_a) = render_sample_pdf("letter") else {
        return;
    };
    let Some(bytes_b) = render_sample_pdf("letter") else {
        return;
    };

    assert_eq!(bytes_a.len(), bytes_b.len(), "PDF sizes should match");
    assert_eq!(
        normalized_hash(&bytes_a),
        normalized_hash(&bytes_b),
        "PDF renders must be deterministic after metadata normalization"
    );
}

#[test]
fn missing_fonts_are_reported_as_font_errors() {
    let _guard = FontSearchGuard::isolate();
    if fonts::fonts_available() {
        eprintln!("Skipping missing font check: fonts are installed in a searched directory.");
        return;
    }

    match PdfBuilder::new().render(&sample_layout("protocol")) {
        Err(PdfBuildError::FontLoad(err)) => {
            assert!(err.to_string().contains("fonts unavailable"));
        }
        Err(other) => panic!("expected a font error, got {other}"),
        Ok(_) => panic!("rendering without fonts should fail"),
    }
}

#[test]
fn scrubbing_masks_volatile_metadata() {
    let a = b"<< /CreationDate(D:20240101) /ID[<ab12> <cd34>] >>".to_vec();
    let b = b"<< /CreationDate(D:20250202) /ID[<ef56> <0789>] >>".to_vec();
    assert_eq!(normalized_hash(&a), normalized_hash(&b));
}
