//! Table and JSON output formatting for CLI commands.

use serde::Serialize;
use tabled::{Table, Tabled};

use tagspace_entity::entry::{EntryNode, TreeEntry};
use tagspace_entity::tag::{Category, Tag};

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// JSON output
    Json,
}

/// Print a list of items in the selected format
pub fn print_list<T: Serialize + Tabled>(items: &[T], format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            if items.is_empty() {
                println!("No results found.");
            } else {
                let table = Table::new(items).to_string();
                println!("{}", table);
            }
        }
        OutputFormat::Json => print_json(items),
    }
}

/// Print any serializable value as pretty JSON
pub fn print_json<T: Serialize + ?Sized>(value: &T) {
    let json = serde_json::to_string_pretty(value).unwrap_or_else(|_| "null".to_string());
    println!("{}", json);
}

/// Print a success message
pub fn print_success(msg: &str) {
    println!("✓ {}", msg);
}

/// Print a warning message
pub fn print_warning(msg: &str) {
    println!("⚠ {}", msg);
}

/// Print an error message
pub fn print_error(msg: &str) {
    eprintln!("✗ {}", msg);
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {:<24} {}", format!("{}:", key), value);
}

/// Render an entry tree with box-drawing guides.
pub fn print_tree(node: &EntryNode) {
    println!("{}", node_label(node));
    print_children(&node.children, "");
}

fn print_children(children: &[EntryNode], prefix: &str) {
    for (i, child) in children.iter().enumerate() {
        let last = i + 1 == children.len();
        let (branch, indent) = if last {
            ("└── ", "    ")
        } else {
            ("├── ", "│   ")
        };
        println!("{prefix}{branch}{}", node_label(child));
        print_children(&child.children, &format!("{prefix}{indent}"));
    }
}

fn node_label(node: &EntryNode) -> String {
    let mut label = node.entry.name.clone();
    if node.entry.is_dir {
        label.push('/');
    }
    if !node.tags.is_empty() {
        label.push_str(&format!("  [{}]", node.tags.join(", ")));
    }
    label
}

/// Entry display row
#[derive(Debug, Serialize, Tabled)]
pub struct EntryRow {
    /// Entry ID
    pub id: String,
    /// Name
    pub name: String,
    /// Kind
    pub kind: &'static str,
    /// Size in bytes
    pub size: String,
    /// Description
    pub description: String,
    /// Last touched
    pub ctime: String,
}

impl From<&TreeEntry> for EntryRow {
    fn from(e: &TreeEntry) -> Self {
        Self {
            id: e.id.to_string(),
            name: e.name.clone(),
            kind: if e.is_dir { "dir" } else { "file" },
            size: e.size.map(|s| s.to_string()).unwrap_or_else(|| "-".into()),
            description: e.description.clone().unwrap_or_default(),
            ctime: e.ctime.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

/// Tag display row
#[derive(Debug, Serialize, Tabled)]
pub struct TagRow {
    /// Tag ID
    pub id: String,
    /// Name
    pub name: String,
    /// Foreground colour
    pub foreground: String,
    /// Background colour
    pub background: String,
    /// Description
    pub description: String,
}

impl From<&Tag> for TagRow {
    fn from(t: &Tag) -> Self {
        Self {
            id: t.id.to_string(),
            name: t.name.clone(),
            foreground: t.foreground.clone().unwrap_or_default(),
            background: t.background.clone().unwrap_or_default(),
            description: t.description.clone().unwrap_or_default(),
        }
    }
}

/// Category display row
#[derive(Debug, Serialize, Tabled)]
pub struct CategoryRow {
    /// Category ID
    pub id: String,
    /// Name
    pub name: String,
    /// Foreground colour
    pub foreground: String,
    /// Background colour
    pub background: String,
    /// Description
    pub description: String,
}

impl From<&Category> for CategoryRow {
    fn from(c: &Category) -> Self {
        Self {
            id: c.id.to_string(),
            name: c.name.clone(),
            foreground: c.foreground.clone().unwrap_or_default(),
            background: c.background.clone().unwrap_or_default(),
            description: c.description.clone().unwrap_or_default(),
        }
    }
}
