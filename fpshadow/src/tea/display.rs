use crate::tea::{ClassId, NodeId, Tea, TeaNode};
use fpshadow_ops::FloatWidth;
use itertools::Itertools;
use std::collections::HashMap;
use std::fmt::{Display, Formatter};

const VARIABLE_NAMES: [&str; 26] = [
    "x", "y", "z", "w", "u", "v", "a", "b", "c", "d", "e", "f", "g", "h", "i", "j", "k", "l", "m",
    "n", "o", "p", "q", "r", "s", "t",
];

fn variable_name(idx: usize) -> String {
    let base = VARIABLE_NAMES[idx % VARIABLE_NAMES.len()];
    match idx / VARIABLE_NAMES.len() {
        0 => base.to_string(),
        n => format!("{}{}", base, n),
    }
}

/// Prints a constant the way FPCore reads it, with the shortest digits that round trip at
/// `width`
pub fn format_literal(bits: u64, width: FloatWidth) -> String {
    let value = f64::from_bits(bits);
    if value.is_nan() {
        "NAN".to_string()
    } else if value.is_infinite() {
        if value > 0.0 {
            "INFINITY".to_string()
        } else {
            "(- INFINITY)".to_string()
        }
    } else if value == 0.0 && value.is_sign_negative() {
        "-0.0".to_string()
    } else if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        match width {
            FloatWidth::F32 => format!("{:?}", value as f32),
            FloatWidth::F64 => format!("{:?}", value),
        }
    }
}

/// A tea printed as a prefix expression, with its free variables in order of appearance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedTea {
    pub vars: Vec<String>,
    pub expr: String,
}

impl RenderedTea {
    /// Wraps the expression as an FPCore benchmark, optionally annotated with its precision
    pub fn fpcore(&self, precision: Option<FloatWidth>) -> String {
        match precision {
            Some(width) => format!(
                "(FPCore ({}) :precision {} {})",
                self.vars.iter().join(" "),
                width.fpcore_precision(),
                self.expr
            ),
            None => format!("(FPCore ({}) {})", self.vars.iter().join(" "), self.expr),
        }
    }
}

impl Display for RenderedTea {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.expr)
    }
}

struct Renderer<'a> {
    tea: &'a Tea,
    width: FloatWidth,
    max_depth: usize,
    names: HashMap<ClassId, String>,
    vars: Vec<String>,
}

impl Renderer<'_> {
    fn name_for(&mut self, path: &[u8]) -> String {
        let class = match self.tea.root_branch() {
            Some(root) => root.class_of(path),
            None => None,
        };
        let Some(class) = class else {
            let name = variable_name(self.vars.len());
            self.vars.push(name.clone());
            return name;
        };
        if let Some(name) = self.names.get(&class) {
            return name.clone();
        }
        let name = variable_name(self.vars.len());
        self.names.insert(class, name.clone());
        self.vars.push(name.clone());
        name
    }

    // Teas are depth bounded, so plain recursion is fine here.
    fn render(&mut self, id: NodeId, path: &mut Vec<u8>) -> String {
        let tea = self.tea;
        match tea.node(id) {
            TeaNode::Leaf(leaf) => match leaf.constant {
                Some(bits) => format_literal(bits, self.width),
                None => self.name_for(path),
            },
            TeaNode::Branch(_) if path.len() >= self.max_depth => "...".to_string(),
            TeaNode::Branch(branch) => {
                let mut args = Vec::with_capacity(branch.children().len());
                for (idx, child) in branch.children().iter().enumerate() {
                    path.push(idx as u8);
                    args.push(self.render(*child, path));
                    path.pop();
                }
                format!("({} {})", branch.op.symbol(), args.iter().join(" "))
            }
        }
    }
}

impl Tea {
    /// Prints the tea, replacing anything more than `max_depth` operations down with `...`.
    ///
    /// Variable leaves in the same equivalence class at the root share a name. Constants are
    /// printed as doubles.
    pub fn render(&self, max_depth: usize) -> RenderedTea {
        self.render_as(FloatWidth::F64, max_depth)
    }

    /// Like [`Tea::render`], with constants printed at the precision the site computes in
    pub fn render_as(&self, width: FloatWidth, max_depth: usize) -> RenderedTea {
        let mut renderer = Renderer {
            tea: self,
            width,
            max_depth,
            names: HashMap::new(),
            vars: Vec::new(),
        };
        let expr = renderer.render(self.root, &mut Vec::new());
        RenderedTea {
            vars: renderer.vars,
            expr,
        }
    }
}
