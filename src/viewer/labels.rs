//! Pooled DOM overlay for cell text.
//!
//! Text is drawn with absolutely positioned divs layered over the canvas
//! rather than rasterized into GL. Labels are rebuilt only when a
//! transition finishes, into a `DocumentFragment` first so the live DOM is
//! touched once per rebuild.

use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlDivElement, HtmlElement};

use crate::error::{Result, TreemapError};
use crate::layout::TextConstants;
use crate::render::InternalCell;
use crate::types::{LabelLayout, ShareLayout, TextLayout};

use super::pool::Pool;

const LAYER_CLASS: &str = "treemapview-labels";
const LABEL_CLASS: &str = "treemapview-label";
const SHARE_CLASS: &str = "treemapview-label treemapview-share";

pub struct LabelLayer {
    document: Document,
    root: HtmlDivElement,
    pool: Pool<HtmlDivElement>,
    active: Vec<HtmlDivElement>,
}

impl LabelLayer {
    /// Create the overlay root under `parent`; `parent` must be positioned
    /// so the absolute label coordinates line up with the canvas.
    pub fn new(document: &Document, parent: &HtmlElement) -> Result<Self> {
        let root = create_div(document)?;
        root.set_class_name(LAYER_CLASS);
        set_style(&root, "position", "absolute")?;
        set_style(&root, "top", "0")?;
        set_style(&root, "left", "0")?;
        set_style(&root, "pointer-events", "none")?;
        parent
            .append_child(&root)
            .map_err(|_| TreemapError::Render("label layer attach failed".to_owned()))?;
        Ok(Self {
            document: document.clone(),
            root,
            pool: Pool::new(),
            active: Vec::new(),
        })
    }

    /// Fade the whole overlay; used for the mid-transition crossfade.
    pub fn set_opacity(&self, value: f64) -> Result<()> {
        set_style(&self.root, "opacity", &format!("{value}"))
    }

    /// Drop all current labels back into the pool.
    pub fn clear(&mut self) {
        for node in self.active.drain(..) {
            node.remove();
            self.pool.release(node);
        }
    }

    /// Rebuild labels for the given keys from the final cell layout.
    pub fn rebuild<'a>(
        &mut self,
        keys: impl Iterator<Item = &'a str>,
        cells: &std::collections::HashMap<String, InternalCell>,
        constants: &TextConstants,
    ) -> Result<()> {
        self.clear();
        let fragment = self.document.create_document_fragment();
        for key in keys {
            let Some(cell) = cells.get(key) else { continue };
            match &cell.text_layout {
                TextLayout::ShowNone => {}
                TextLayout::ShowBoth { label, share } => {
                    if let LabelLayout::Text {
                        font_size,
                        use_margin,
                        lines,
                        ..
                    } = label
                    {
                        let node = self.build_label(cell, *font_size, *use_margin, lines, constants)?;
                        append(&fragment, &node)?;
                        self.active.push(node);
                    }
                    if let ShareLayout::Text { font_size, text } = share {
                        let node = self.build_share(cell, *font_size, text, Some(constants))?;
                        append(&fragment, &node)?;
                        self.active.push(node);
                    }
                }
                TextLayout::ShowOnlyShare { share } => {
                    if let ShareLayout::Text { font_size, text } = share {
                        let node = self.build_share(cell, *font_size, text, None)?;
                        append(&fragment, &node)?;
                        self.active.push(node);
                    }
                }
            }
        }
        self.root
            .append_child(&fragment)
            .map_err(|_| TreemapError::Render("label fragment attach failed".to_owned()))?;
        Ok(())
    }

    fn acquire_div(&mut self) -> Result<HtmlDivElement> {
        match self.pool.acquire() {
            Some(node) => Ok(node),
            None => create_div(&self.document),
        }
    }

    fn build_label(
        &mut self,
        cell: &InternalCell,
        font_size: f64,
        use_margin: bool,
        lines: &[String],
        constants: &TextConstants,
    ) -> Result<HtmlDivElement> {
        let width = cell.x1 - cell.x0;
        let height = (cell.y1 - cell.y0) * (1.0 - constants.share_band_proportion);
        let node = self.acquire_div()?;
        node.set_class_name(LABEL_CLASS);
        node.set_text_content(Some(&lines.join("\n")));
        place(&node, cell.x0, cell.y0, width, height, font_size)?;
        set_style(&node, "white-space", "pre-line")?;
        if use_margin {
            set_style(
                &node,
                "padding",
                &format!(
                    "{}px {}px 0",
                    constants.label_top_margin * (cell.y1 - cell.y0),
                    constants.label_horizontal_margin * width
                ),
            )?;
        } else {
            set_style(&node, "padding", "0")?;
        }
        Ok(node)
    }

    /// Share text sits in the bottom band when a label is shown above it,
    /// otherwise it gets the whole cell.
    fn build_share(
        &mut self,
        cell: &InternalCell,
        font_size: f64,
        text: &str,
        band: Option<&TextConstants>,
    ) -> Result<HtmlDivElement> {
        let width = cell.x1 - cell.x0;
        let full_height = cell.y1 - cell.y0;
        let (top, height) = match band {
            Some(constants) => {
                let band_height = full_height * constants.share_band_proportion;
                (cell.y1 - band_height, band_height)
            }
            None => (cell.y0, full_height),
        };
        let node = self.acquire_div()?;
        node.set_class_name(SHARE_CLASS);
        node.set_text_content(Some(text));
        place(&node, cell.x0, top, width, height, font_size)?;
        set_style(&node, "padding", "0")?;
        Ok(node)
    }
}

fn create_div(document: &Document) -> Result<HtmlDivElement> {
    document
        .create_element("div")
        .map_err(|_| TreemapError::Render("label div creation failed".to_owned()))?
        .dyn_into::<HtmlDivElement>()
        .map_err(|_| TreemapError::Render("label div has wrong type".to_owned()))
}

fn append(fragment: &web_sys::DocumentFragment, node: &Element) -> Result<()> {
    fragment
        .append_child(node)
        .map(|_| ())
        .map_err(|_| TreemapError::Render("label append failed".to_owned()))
}

fn place(
    node: &HtmlElement,
    left: f64,
    top: f64,
    width: f64,
    height: f64,
    font_size: f64,
) -> Result<()> {
    set_style(node, "position", "absolute")?;
    set_style(node, "left", &format!("{left}px"))?;
    set_style(node, "top", &format!("{top}px"))?;
    set_style(node, "width", &format!("{width}px"))?;
    set_style(node, "height", &format!("{height}px"))?;
    set_style(node, "font-size", &format!("{font_size}px"))?;
    set_style(node, "overflow", "hidden")?;
    set_style(node, "box-sizing", "border-box")?;
    Ok(())
}

fn set_style(node: &HtmlElement, property: &str, value: &str) -> Result<()> {
    node.style()
        .set_property(property, value)
        .map_err(|_| TreemapError::Render(format!("style write failed: {property}")))
}
