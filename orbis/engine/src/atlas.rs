//! Binary-tree texture atlas packing over a fixed square canvas.
//!
//! Nodes live in a flat arena indexed by `u32`, so a repack is a plain
//! arena reset rather than a tree teardown, and insertion walks an explicit
//! stack instead of recursing. Every append repacks the whole image set:
//! images are sorted ascending by (width, height), the tree is rebuilt and
//! the canvas re-rasterized, which makes the final packing a pure function
//! of the image multiset regardless of insertion order.

use crate::canvas::{Canvas, RasterImage};

/// Packing parameters.
#[derive(Clone, Copy, Debug)]
pub struct AtlasParams {
    /// Edge length of the square canvas, pixels.
    pub size: u32,
    /// Padding added on each side of an image before placement.
    pub border: u32,
    /// Leftover slack (pixels, per axis) still accepted as an exact fit.
    pub fit_slack: u32,
}

impl Default for AtlasParams {
    fn default() -> Self {
        Self { size: 1024, border: 4, fit_slack: 0 }
    }
}

/// Pixel rectangle inside the canvas.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AtlasRect {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Normalized [0,1] corners of a packed image's two-triangle quad.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TexCoords {
    /// Top-left corner.
    pub tl: [f32; 2],
    /// Bottom-left corner.
    pub bl: [f32; 2],
    /// Top-right corner.
    pub tr: [f32; 2],
    /// Bottom-right corner.
    pub br: [f32; 2],
}

/// Errors raised by atlas insertion.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AtlasError {
    /// No free region anywhere in the tree can host the image.
    #[error("no room for {width}x{height} image in atlas")]
    Overflow {
        /// Rejected image width.
        width: u32,
        /// Rejected image height.
        height: u32,
    },
    /// Zero-sized images cannot be packed.
    #[error("zero-sized image")]
    EmptyImage,
}

/// One BSP node: a free leaf, an occupied leaf, or a split with two children.
#[derive(Clone, Copy, Debug)]
struct Node {
    rect: AtlasRect,
    children: Option<[u32; 2]>,
    /// Index into the staged image list once occupied.
    image: Option<usize>,
}

impl Node {
    fn leaf(rect: AtlasRect) -> Self {
        Self { rect, children: None, image: None }
    }
}

/// Texture atlas: image set, BSP arena, rasterized canvas, per-image
/// placement rectangles and texture coordinates.
///
/// Insertion order of images is preserved for indexing; packing order is
/// not (the repack sorts by size).
pub struct TextureAtlas {
    params: AtlasParams,
    images: Vec<RasterImage>,
    nodes: Vec<Node>,
    rects: Vec<AtlasRect>,
    coords: Vec<TexCoords>,
    canvas: Canvas,
}

impl TextureAtlas {
    /// Empty atlas over a cleared canvas.
    #[must_use]
    pub fn new(params: AtlasParams) -> Self {
        Self {
            params,
            images: Vec::new(),
            nodes: Vec::new(),
            rects: Vec::new(),
            coords: Vec::new(),
            canvas: Canvas::new(params.size, params.size),
        }
    }

    /// Packing parameters in force.
    #[must_use]
    pub fn params(&self) -> AtlasParams {
        self.params
    }

    /// Number of packed images.
    #[must_use]
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// True when no image has been packed yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Append an image and repack the whole set.
    ///
    /// Returns the image's stable insertion index. On overflow the previous
    /// packing (tree, canvas, coordinates) is left untouched and the new
    /// image is not retained.
    pub fn add_image(&mut self, image: RasterImage) -> Result<usize, AtlasError> {
        if image.width == 0 || image.height == 0 {
            return Err(AtlasError::EmptyImage);
        }
        // Repack into staging state; swap only on success.
        let mut staged: Vec<RasterImage> = Vec::with_capacity(self.images.len() + 1);
        staged.extend(self.images.iter().cloned());
        staged.push(image);

        let mut order: Vec<usize> = (0..staged.len()).collect();
        order.sort_by_key(|&i| (staged[i].width, staged[i].height));

        let mut nodes = vec![Node::leaf(AtlasRect {
            x: 0,
            y: 0,
            width: self.params.size,
            height: self.params.size,
        })];
        let mut rects = vec![AtlasRect::default(); staged.len()];
        for &i in &order {
            let img = &staged[i];
            let w = img.width + 2 * self.params.border;
            let h = img.height + 2 * self.params.border;
            let Some(node) = insert(&mut nodes, w, h, self.params.fit_slack) else {
                return Err(AtlasError::Overflow { width: img.width, height: img.height });
            };
            nodes[node].image = Some(i);
            rects[i] = nodes[node].rect;
        }

        let mut canvas = Canvas::new(self.params.size, self.params.size);
        let mut coords = Vec::with_capacity(staged.len());
        for (img, rect) in staged.iter().zip(&rects) {
            canvas.draw_image(img, rect.x + self.params.border, rect.y + self.params.border);
            coords.push(tex_coords_for(rect, img, self.params));
        }

        println!("[atlas] repacked {} image(s) into {}px canvas", staged.len(), self.params.size);

        self.images = staged;
        self.nodes = nodes;
        self.rects = rects;
        self.coords = coords;
        self.canvas = canvas;
        Ok(self.images.len() - 1)
    }

    /// Padded placement rectangle of image `index` (insertion order).
    #[must_use]
    pub fn rect(&self, index: usize) -> AtlasRect {
        self.rects[index]
    }

    /// Normalized texture coordinates of image `index` (insertion order).
    #[must_use]
    pub fn tex_coords(&self, index: usize) -> TexCoords {
        self.coords[index]
    }

    /// Source image at `index` (insertion order).
    #[must_use]
    pub fn image(&self, index: usize) -> &RasterImage {
        &self.images[index]
    }

    /// The rasterized canvas; upload this after every successful append.
    #[must_use]
    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }
}

impl Default for TextureAtlas {
    fn default() -> Self {
        Self::new(AtlasParams::default())
    }
}

/// Find (splitting as needed) a leaf hosting a `w`×`h` padded rectangle.
///
/// Depth-first, first child before second; occupied or too-small leaves are
/// skipped so the walk falls through to the sibling. `None` means no
/// subtree anywhere has room, which is the caller's overflow.
fn insert(nodes: &mut Vec<Node>, w: u32, h: u32, fit_slack: u32) -> Option<usize> {
    let mut stack: Vec<u32> = vec![0];
    while let Some(id) = stack.pop() {
        let node = nodes[id as usize];
        if let Some([first, second]) = node.children {
            stack.push(second);
            stack.push(first);
            continue;
        }
        if node.image.is_some() {
            continue;
        }
        let rc = node.rect;
        if w > rc.width || h > rc.height {
            continue;
        }
        let slack_w = rc.width - w;
        let slack_h = rc.height - h;
        if slack_w <= fit_slack && slack_h <= fit_slack {
            return Some(id as usize);
        }
        // Split along the larger-slack axis so children stay near-square;
        // the first child is cut to the exact size on that axis.
        let (first, second) = if slack_w > slack_h {
            (
                AtlasRect { x: rc.x, y: rc.y, width: w, height: rc.height },
                AtlasRect { x: rc.x + w, y: rc.y, width: slack_w, height: rc.height },
            )
        } else {
            (
                AtlasRect { x: rc.x, y: rc.y, width: rc.width, height: h },
                AtlasRect { x: rc.x, y: rc.y + h, width: rc.width, height: slack_h },
            )
        };
        let a = u32::try_from(nodes.len()).unwrap_or(u32::MAX);
        nodes.push(Node::leaf(first));
        nodes.push(Node::leaf(second));
        nodes[id as usize].children = Some([a, a + 1]);
        stack.push(a + 1);
        stack.push(a);
    }
    None
}

/// Corners of the image proper (padded rect inset by the border), normalized
/// by the canvas size. Y grows downward, matching texture space.
fn tex_coords_for(rect: &AtlasRect, img: &RasterImage, params: AtlasParams) -> TexCoords {
    #[allow(clippy::cast_precision_loss)]
    let s = params.size as f32;
    #[allow(clippy::cast_precision_loss)]
    let x0 = (rect.x + params.border) as f32 / s;
    #[allow(clippy::cast_precision_loss)]
    let y0 = (rect.y + params.border) as f32 / s;
    #[allow(clippy::cast_precision_loss)]
    let x1 = (rect.x + params.border + img.width) as f32 / s;
    #[allow(clippy::cast_precision_loss)]
    let y1 = (rect.y + params.border + img.height) as f32 / s;
    TexCoords { tl: [x0, y0], bl: [x0, y1], tr: [x1, y0], br: [x1, y1] }
}
