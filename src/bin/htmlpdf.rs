use std::env;
use std::fs;
use std::process::ExitCode;

use htmlpdf::{Alignment, ChunkId, ChunkKind, ChunkTree, Color, HtmlParser, Style};

#[derive(Clone, Debug)]
enum Json {
    Null,
    Bool(bool),
    Num(f64),
    Str(String),
    Arr(Vec<Json>),
    Obj(Vec<(String, Json)>),
}

impl Json {
    fn render(&self, pretty: bool) -> String {
        let mut out = String::new();
        self.write_into(&mut out, pretty, 0);
        out
    }

    fn write_into(&self, out: &mut String, pretty: bool, depth: usize) {
        match self {
            Json::Null => out.push_str("null"),
            Json::Bool(v) => out.push_str(if *v { "true" } else { "false" }),
            // NaN and infinities have no JSON spelling
            Json::Num(v) if !v.is_finite() => out.push_str("null"),
            Json::Num(v) => out.push_str(&v.to_string()),
            Json::Str(v) => write_json_string(out, v),
            Json::Arr(items) => write_seq(out, pretty, depth, ('[', ']'), items, |out, item| {
                item.write_into(out, pretty, depth + 1)
            }),
            Json::Obj(fields) => write_seq(out, pretty, depth, ('{', '}'), fields, |out, (key, value)| {
                write_json_string(out, key);
                out.push_str(if pretty { ": " } else { ":" });
                value.write_into(out, pretty, depth + 1);
            }),
        }
    }
}

/// Comma-separated members between `delims`, one per line when pretty.
fn write_seq<T>(
    out: &mut String,
    pretty: bool,
    depth: usize,
    delims: (char, char),
    members: &[T],
    mut write_member: impl FnMut(&mut String, &T),
) {
    out.push(delims.0);
    for (idx, member) in members.iter().enumerate() {
        if idx > 0 {
            out.push(',');
        }
        if pretty {
            out.push('\n');
            out.push_str(&"  ".repeat(depth + 1));
        }
        write_member(out, member);
    }
    if pretty && !members.is_empty() {
        out.push('\n');
        out.push_str(&"  ".repeat(depth));
    }
    out.push(delims.1);
}

fn write_json_string(out: &mut String, s: &str) {
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' | '\\' => {
                out.push('\\');
                out.push(ch);
            }
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
}

fn main() -> ExitCode {
    match run(env::args().collect()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(msg) => {
            eprintln!("error: {}", msg);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Vec<String>) -> Result<(), String> {
    let mut rest = args.into_iter().skip(1).collect::<Vec<_>>();
    let pretty = pop_flag(&mut rest, "--pretty");
    if rest.is_empty() || rest[0] == "--help" || rest[0] == "-h" {
        print_help();
        return Ok(());
    }

    let cmd = rest.remove(0);
    match cmd.as_str() {
        "tree" => {
            let path = first_arg(&rest, "tree requires <html_path>")?;
            let tree = load_tree(&path)?;
            let output = Json::Obj(vec![
                ("html".to_string(), Json::Str(path)),
                ("chunks".to_string(), Json::Num(tree.len() as f64)),
                ("root".to_string(), chunk_json(&tree, tree.root())),
            ]);
            println!("{}", output.render(pretty));
        }
        "outline" => {
            let path = first_arg(&rest, "outline requires <html_path>")?;
            let tree = load_tree(&path)?;
            let mut out = String::new();
            write_outline(&tree, tree.root(), 0, &mut out);
            print!("{}", out);
        }
        other => return Err(format!("unknown command '{}'", other)),
    }

    Ok(())
}

fn load_tree(path: &str) -> Result<ChunkTree, String> {
    let html = fs::read_to_string(path).map_err(|err| format!("{}: {}", path, err))?;
    HtmlParser::new()
        .try_parse(&html)
        .map_err(|err| err.to_string())
}

fn first_arg(args: &[String], msg: &str) -> Result<String, String> {
    args.first().cloned().ok_or_else(|| msg.to_string())
}

fn pop_flag(args: &mut Vec<String>, flag: &str) -> bool {
    if let Some(pos) = args.iter().position(|a| a == flag) {
        args.remove(pos);
        true
    } else {
        false
    }
}

fn chunk_json(tree: &ChunkTree, id: ChunkId) -> Json {
    let chunk = &tree[id];
    let mut fields = vec![
        ("tag".to_string(), Json::Str(chunk.tag().name().to_string())),
        ("kind".to_string(), Json::Str(chunk.kind().label().to_string())),
        (
            "class".to_string(),
            chunk
                .class_name()
                .map_or(Json::Null, |c| Json::Str(c.to_string())),
        ),
        (
            "text".to_string(),
            chunk.text().map_or(Json::Null, |t| Json::Str(t.to_string())),
        ),
        (
            "style".to_string(),
            chunk.style().map_or(Json::Null, style_json),
        ),
    ];
    if let Some(bullet) = tree.bullet_text(id) {
        fields.push(("bullet".to_string(), Json::Str(bullet)));
    }
    if !chunk.kind().is_leaf() {
        fields.push((
            "new_line".to_string(),
            Json::Bool(tree.is_new_line(id)),
        ));
    }
    fields.push((
        "children".to_string(),
        Json::Arr(
            tree.children(id)
                .iter()
                .map(|child| chunk_json(tree, *child))
                .collect(),
        ),
    ));
    Json::Obj(fields)
}

fn style_json(style: &Style) -> Json {
    let flags = style.font.style;
    Json::Obj(vec![
        (
            "family".to_string(),
            Json::Str(style.font.family.name().to_string()),
        ),
        ("size".to_string(), Json::Num(f64::from(style.font.size))),
        ("bold".to_string(), Json::Bool(flags.bold)),
        ("italic".to_string(), Json::Bool(flags.italic)),
        ("underline".to_string(), Json::Bool(flags.underline)),
        ("color".to_string(), Json::Str(hex(style.text_color))),
        ("fill".to_string(), Json::Str(hex(style.fill_color))),
        (
            "align".to_string(),
            Json::Str(alignment_name(style.alignment).to_string()),
        ),
        (
            "margins".to_string(),
            Json::Arr(vec![
                Json::Num(f64::from(style.margins.top)),
                Json::Num(f64::from(style.margins.right)),
                Json::Num(f64::from(style.margins.bottom)),
                Json::Num(f64::from(style.margins.left)),
            ]),
        ),
    ])
}

fn hex(color: Color) -> String {
    format!("#{:02x}{:02x}{:02x}", color.r, color.g, color.b)
}

fn alignment_name(alignment: Alignment) -> &'static str {
    match alignment {
        Alignment::Left => "left",
        Alignment::Right => "right",
        Alignment::Center => "center",
        Alignment::Justify => "justify",
    }
}

fn write_outline(tree: &ChunkTree, id: ChunkId, depth: usize, out: &mut String) {
    let chunk = &tree[id];
    for _ in 0..depth {
        out.push_str("  ");
    }
    match chunk.kind() {
        ChunkKind::Text(text) => {
            out.push_str(&format!("{:?}", text));
        }
        kind => {
            out.push('<');
            out.push_str(chunk.tag().name());
            out.push('>');
            if let Some(class) = chunk.class_name() {
                out.push_str(&format!(" .{}", class));
            }
            if let Some(bullet) = tree.bullet_text(id) {
                out.push_str(&format!(" [{}]", bullet));
            } else if kind.is_leaf() {
                out.push_str(&format!(" ({})", kind.label()));
            }
        }
    }
    out.push('\n');
    for child in tree.children(id) {
        write_outline(tree, *child, depth + 1, out);
    }
}

fn print_help() {
    let help = r#"htmlpdf - inspect how HTML is split into renderable chunks

USAGE:
  htmlpdf [--pretty] <command> [args...]

COMMANDS:
  tree <html_path>       chunk tree with resolved styles
  outline <html_path>    indented outline of the chunk tree

NOTES:
  - `tree` output is JSON.
  - Exits with status 1 when the document has nothing to render.
"#;
    println!("{}", help);
}
