use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::id_generator::IdGenerator;

/// Renderer tag carried by every block.
///
/// The engine never interprets a tag beyond the container/grid checks below;
/// each tag selects an external renderer and its prop schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Section,
    Row,
    Column,
    Container,
    Group,
    Form,
    Grid,
    Box,
    Text,
    Heading,
    Image,
    Button,
    Video,
    Divider,
    Spacer,
    Icon,
    List,
    Quote,
    Code,
    Embed,
    Input,
    Textarea,
    Select,
    Checkbox,
    Label,
    Link,
    Audio,
    Map,
    Countdown,
    Survey,
    Carousel,
    Gallery,
    Navbar,
    Footer,
    Card,
    Badge,
    Table,
    Progress,
    /// Placeholder occupying an unfilled fixed slot (grid cell).
    Empty,
}

impl BlockKind {
    /// Kinds that accept nested children when a drop resolves to "inside".
    pub fn is_container(self) -> bool {
        matches!(
            self,
            BlockKind::Section
                | BlockKind::Row
                | BlockKind::Column
                | BlockKind::Container
                | BlockKind::Group
                | BlockKind::Form
                | BlockKind::Grid
                | BlockKind::Box
        )
    }

    /// Grid containers address children by fixed cell position.
    pub fn is_grid(self) -> bool {
        matches!(self, BlockKind::Grid)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BlockKind::Section => "section",
            BlockKind::Row => "row",
            BlockKind::Column => "column",
            BlockKind::Container => "container",
            BlockKind::Group => "group",
            BlockKind::Form => "form",
            BlockKind::Grid => "grid",
            BlockKind::Box => "box",
            BlockKind::Text => "text",
            BlockKind::Heading => "heading",
            BlockKind::Image => "image",
            BlockKind::Button => "button",
            BlockKind::Video => "video",
            BlockKind::Divider => "divider",
            BlockKind::Spacer => "spacer",
            BlockKind::Icon => "icon",
            BlockKind::List => "list",
            BlockKind::Quote => "quote",
            BlockKind::Code => "code",
            BlockKind::Embed => "embed",
            BlockKind::Input => "input",
            BlockKind::Textarea => "textarea",
            BlockKind::Select => "select",
            BlockKind::Checkbox => "checkbox",
            BlockKind::Label => "label",
            BlockKind::Link => "link",
            BlockKind::Audio => "audio",
            BlockKind::Map => "map",
            BlockKind::Countdown => "countdown",
            BlockKind::Survey => "survey",
            BlockKind::Carousel => "carousel",
            BlockKind::Gallery => "gallery",
            BlockKind::Navbar => "navbar",
            BlockKind::Footer => "footer",
            BlockKind::Card => "card",
            BlockKind::Badge => "badge",
            BlockKind::Table => "table",
            BlockKind::Progress => "progress",
            BlockKind::Empty => "empty",
        }
    }
}

impl std::fmt::Display for BlockKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A node in the document tree.
///
/// `props` is an opaque bag owned by the block's renderer; the engine only
/// shallow-merges into it. A missing `children` field in external JSON and an
/// empty vec are the same state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: BlockKind,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub props: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Block>,
}

impl Block {
    pub fn new(kind: BlockKind, ids: &mut IdGenerator) -> Self {
        Self {
            id: ids.new_id(),
            kind,
            props: Map::new(),
            children: Vec::new(),
        }
    }

    /// Placeholder block that keeps an unfilled grid cell addressable.
    pub fn empty_slot(ids: &mut IdGenerator) -> Self {
        Self::new(BlockKind::Empty, ids)
    }

    pub fn is_empty_slot(&self) -> bool {
        self.kind == BlockKind::Empty
    }

    /// Number of nodes in this subtree, root included.
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(Block::subtree_len).sum::<usize>()
    }
}

/// Id-less description of a block subtree.
///
/// Palette entries and saved templates are stored in this shape; ids are
/// assigned only at instantiation time so a template can be stamped out any
/// number of times.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockTemplate {
    #[serde(rename = "type")]
    pub kind: BlockKind,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub props: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<BlockTemplate>,
}

impl BlockTemplate {
    pub fn new(kind: BlockKind) -> Self {
        Self {
            kind,
            props: Map::new(),
            children: Vec::new(),
        }
    }

    pub fn with_prop(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.props.insert(key.to_string(), value.into());
        self
    }

    pub fn with_child(mut self, child: BlockTemplate) -> Self {
        self.children.push(child);
        self
    }

    /// Assign fresh ids depth-first and produce a live block.
    pub fn instantiate(&self, ids: &mut IdGenerator) -> Block {
        Block {
            id: ids.new_id(),
            kind: self.kind,
            props: self.props.clone(),
            children: self
                .children
                .iter()
                .map(|child| child.instantiate(ids))
                .collect(),
        }
    }
}
