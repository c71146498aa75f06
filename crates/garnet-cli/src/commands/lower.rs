//! `garnet lower`: lower a JSON syntax tree and print the result

use anyhow::Context;
use garnet_engine::nodes::Kind;
use garnet_engine::{
    CoverageManager, LoweredBody, Node, ParserContext, PrettyPrint, Source, SyntaxNode,
    TranslationContext, Translator, TranslatorOptions,
};
use log::debug;
use std::path::PathBuf;
use std::sync::Arc;

/// Options of `garnet lower`
pub struct LowerArgs {
    pub tree: PathBuf,
    pub source: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub coverage: bool,
    pub eval: bool,
    pub core: bool,
    pub force_eager: bool,
}

pub fn execute(args: LowerArgs) -> anyhow::Result<()> {
    let options = match &args.config {
        Some(path) => TranslatorOptions::from_file(path)
            .with_context(|| format!("loading options from {}", path.display()))?,
        None => TranslatorOptions::default(),
    };

    let json = std::fs::read_to_string(&args.tree)
        .with_context(|| format!("reading {}", args.tree.display()))?;
    let tree = SyntaxNode::from_json(&json)
        .with_context(|| format!("parsing syntax tree {}", args.tree.display()))?;

    let source = match &args.source {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading source {}", path.display()))?;
            Source::new(path.display().to_string(), text)
        }
        None => Source::new(args.tree.display().to_string(), String::new()),
    };
    let source_name = source.name().to_string();

    let mut context = TranslationContext::new(source)
        .with_core(args.core)
        .with_core_detection(&options)
        .with_coverage(args.coverage);
    if args.eval {
        context = context.with_parser_context(ParserContext::Eval { binding: Vec::new() });
    }

    let coverage = Arc::new(CoverageManager::new());
    let body = Translator::new(options)
        .with_coverage(coverage.clone())
        .translate(context, &tree)
        .with_context(|| format!("lowering {}", source_name))?;

    print!("{}", body.pretty_print());
    print_definitions(&body, args.force_eager)?;

    if args.coverage {
        let lines: Vec<String> = coverage
            .lines_with_code(&source_name)
            .iter()
            .map(u32::to_string)
            .collect();
        println!("# coverage: {}", lines.join(", "));
    }
    Ok(())
}

/// Print the bodies of methods and modules defined in `body`
///
/// Deferred method bodies are printed only when `force` is set, which lowers them.
fn print_definitions(body: &LoweredBody, force: bool) -> anyhow::Result<()> {
    let mut definitions: Vec<&Node> = Vec::new();
    body.root.walk(&mut |node| {
        if matches!(node.kind, Kind::DefineMethod { .. } | Kind::OpenModule { .. }) {
            definitions.push(node);
        }
    });

    for node in definitions {
        match &node.kind {
            Kind::DefineMethod { name, method, .. } => {
                if !force && !method.body.is_lowered() {
                    println!("\n## def {} (deferred)", name);
                    continue;
                }
                debug!("printing method {}", name);
                let lowered = method
                    .body
                    .get()
                    .with_context(|| format!("lowering method {}", name))?;
                println!("\n## def {}", name);
                print!("{}", lowered.pretty_print());
                print_definitions(&lowered, force)?;
            }
            Kind::OpenModule { definition, .. } => {
                println!("\n## {:?} {}", definition.kind, definition.name);
                print!("{}", definition.body.pretty_print());
                print_definitions(&definition.body, force)?;
            }
            _ => {}
        }
    }
    Ok(())
}
