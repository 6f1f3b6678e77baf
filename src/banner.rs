//! ASCII banner rendering for `/banner` and `/banner-font`.

use std::path::PathBuf;

use figlet_rs::FIGfont;

use crate::{ChatError, Result};

/// Fonts compiled into the binary, by name.
const BUILTIN_FONTS: &[(&str, &str)] = &[
    ("script", include_str!("../fonts/script.flf")),
    ("shadow", include_str!("../fonts/shadow.flf")),
];

/// Renders text as ASCII art no wider than a column budget.
pub trait BannerRenderer: Send + Sync {
    /// Render `text` with the named font, or the default font when `None`.
    fn render(&self, font: Option<&str>, text: &str, width: usize) -> Result<String>;
}

/// FIGlet renderer.
///
/// The default font is "standard". A named font is read from
/// `<fonts_dir>/<name>.flf` when that file exists, otherwise from the fonts
/// compiled into the binary.
#[derive(Debug, Clone)]
pub struct FigletBanner {
    fonts_dir: PathBuf,
}

impl FigletBanner {
    /// Create a renderer looking up named fonts in `fonts_dir`.
    pub fn new(fonts_dir: impl Into<PathBuf>) -> Self {
        Self {
            fonts_dir: fonts_dir.into(),
        }
    }

    fn load_font(&self, font: Option<&str>) -> Result<FIGfont> {
        let name = match font {
            None | Some("standard") => return FIGfont::standard().map_err(ChatError::Banner),
            Some(name) => name,
        };

        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(ChatError::Banner(format!("invalid font name: {name}")));
        }

        let path = self.fonts_dir.join(format!("{name}.flf"));
        if path.is_file() {
            let path = path
                .to_str()
                .ok_or_else(|| ChatError::Banner(format!("font path is not UTF-8: {name}")))?;
            return FIGfont::from_file(path).map_err(ChatError::Banner);
        }

        BUILTIN_FONTS
            .iter()
            .find(|(builtin, _)| *builtin == name)
            .ok_or_else(|| ChatError::Banner(format!("font not found: {name}")))
            .and_then(|(_, content)| FIGfont::from_content(content).map_err(ChatError::Banner))
    }
}

fn render_block(font: &FIGfont, text: &str) -> Result<String> {
    let figure = font
        .convert(text)
        .ok_or_else(|| ChatError::Banner(format!("cannot render {text:?}")))?;
    let rendered = figure.to_string();
    let lines: Vec<&str> = rendered.lines().map(str::trim_end).collect();
    Ok(lines.join("\n"))
}

fn block_width(block: &str) -> usize {
    block
        .lines()
        .map(|line| line.chars().count())
        .max()
        .unwrap_or(0)
}

impl BannerRenderer for FigletBanner {
    fn render(&self, font: Option<&str>, text: &str, width: usize) -> Result<String> {
        let font = self.load_font(font)?;

        let mut blocks = Vec::new();
        let mut current = String::new();
        for word in text.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };
            if !current.is_empty() && block_width(&render_block(&font, &candidate)?) > width {
                blocks.push(render_block(&font, &current)?);
                current = word.to_string();
            } else {
                current = candidate;
            }
        }
        if current.is_empty() {
            return Err(ChatError::Banner("nothing to render".to_string()));
        }
        blocks.push(render_block(&font, &current)?);

        Ok(blocks.join("\n"))
    }
}
