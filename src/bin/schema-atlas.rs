//! Schema Atlas CLI
//!
//! Command-line interface for resolving references, inspecting schema
//! details and synthesizing example payloads.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use schema_atlas::{
    collect_markers, generate_example_at, load_document, load_document_auto, property_reference,
    resolve_title, should_show_in_stage, unique_messages, DocumentSet, Lookup, LookupResult,
    NavigationPath, PathElement, Reference, SchemaNode, Stage,
};

#[derive(Parser)]
#[command(name = "schema-atlas")]
#[command(about = "Resolve references and synthesize examples for JSON Schema documentation")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a reference to its canonical target schema
    Resolve {
        /// Schema source: file path or URL (http:// or https://)
        source: String,

        /// Reference to resolve (defaults to the document root)
        #[arg(long = "ref", default_value = "#")]
        reference: String,

        /// Additional documents, as name=path pairs
        #[arg(long = "import")]
        imports: Vec<String>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Synthesize an example payload for a schema node
    Example {
        /// Schema source: file path or URL (http:// or https://)
        source: String,

        /// Reference of the node to synthesize (defaults to the root)
        #[arg(long = "ref", default_value = "#")]
        reference: String,

        /// Release stage to document (draft, beta or stable)
        #[arg(long, default_value = "stable")]
        stage: String,

        /// Output format: json or yaml
        #[arg(long, default_value = "json")]
        format: String,

        /// Additional documents, as name=path pairs
        #[arg(long = "import")]
        imports: Vec<String>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Show the details view for a schema node as text
    Inspect {
        /// Schema source: file path or URL (http:// or https://)
        source: String,

        /// Reference of the node to inspect (defaults to the root)
        #[arg(long = "ref", default_value = "#")]
        reference: String,

        /// Release stage to document (draft, beta or stable)
        #[arg(long, default_value = "stable")]
        stage: String,

        /// Drill down through a dot-separated property trail first
        #[arg(long)]
        follow: Option<String>,

        /// Additional documents, as name=path pairs
        #[arg(long = "import")]
        imports: Vec<String>,
    },

    /// Display validation markers for an instance document
    Validate {
        /// Schema source: file path or URL
        source: String,

        /// Instance document to check
        instance: PathBuf,

        /// Output results as JSON (for automation)
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Resolve {
            source,
            reference,
            imports,
            pretty,
        } => run_resolve(&source, &reference, &imports, pretty),

        Commands::Example {
            source,
            reference,
            stage,
            format,
            imports,
            pretty,
        } => run_example(&source, &reference, &stage, &format, &imports, pretty),

        Commands::Inspect {
            source,
            reference,
            stage,
            follow,
            imports,
        } => run_inspect(&source, &reference, &stage, follow.as_deref(), &imports),

        Commands::Validate {
            source,
            instance,
            json,
        } => run_validate(&source, &instance, json),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

/// Build the document set: the root source plus any --import name=path.
fn load_documents(source: &str, imports: &[String]) -> Result<DocumentSet, u8> {
    let root = load_document_auto(source).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;
    let mut documents = DocumentSet::new(root);
    for import in imports {
        let Some((name, path)) = import.split_once('=') else {
            eprintln!("Error: invalid --import \"{}\": expected name=path", import);
            return Err(2);
        };
        let loaded = load_document_auto(path).map_err(|e| {
            eprintln!("Error: {}", e);
            e.exit_code() as u8
        })?;
        documents.insert(name, loaded);
    }
    Ok(documents)
}

fn parse_stage(stage: &str) -> Result<Stage, u8> {
    Stage::parse(stage).ok_or_else(|| {
        eprintln!(
            "Error: unknown stage \"{}\": expected draft, beta, or stable",
            stage
        );
        2
    })
}

fn run_resolve(
    source: &str,
    reference: &str,
    imports: &[String],
    pretty: bool,
) -> Result<(), u8> {
    let documents = load_documents(source, imports)?;
    let lookup = Lookup::new(&documents);

    let output = match lookup.resolve_reference(reference) {
        None => {
            eprintln!("Error: reference not found: {}", reference);
            return Err(1);
        }
        Some(LookupResult::External { reference }) => {
            serde_json::json!({ "reference": reference, "external": true })
        }
        Some(LookupResult::Resolved { base_reference, .. }) => {
            let canonical = base_reference.unwrap_or_else(|| reference.to_string());
            let raw = lookup
                .raw_fragment(&canonical)
                .cloned()
                .unwrap_or(serde_json::Value::Null);
            serde_json::json!({ "reference": canonical, "schema": raw })
        }
    };

    let rendered = if pretty {
        serde_json::to_string_pretty(&output)
    } else {
        serde_json::to_string(&output)
    }
    .map_err(|e| {
        eprintln!("Error serializing output: {}", e);
        2u8
    })?;
    println!("{}", rendered);
    Ok(())
}

fn run_example(
    source: &str,
    reference: &str,
    stage: &str,
    format: &str,
    imports: &[String],
    pretty: bool,
) -> Result<(), u8> {
    if format != "json" && format != "yaml" {
        eprintln!("Error: unknown format \"{}\": expected json or yaml", format);
        return Err(2);
    }
    let documents = load_documents(source, imports)?;
    let lookup = Lookup::new(&documents);
    let stage = parse_stage(stage)?;

    let (schema, origin) = match lookup.resolve_reference(reference) {
        None => {
            eprintln!("Error: reference not found: {}", reference);
            return Err(1);
        }
        Some(LookupResult::External { reference }) => {
            eprintln!(
                "Error: {} is an external reference; load its document to generate an example",
                reference
            );
            return Err(1);
        }
        Some(LookupResult::Resolved {
            schema,
            base_reference,
        }) => (
            schema,
            base_reference.unwrap_or_else(|| reference.to_string()),
        ),
    };

    match generate_example_at(&schema, &lookup, stage, &origin) {
        Ok(value) => {
            if format == "yaml" {
                let rendered = serde_yaml::to_string(&value).map_err(|e| {
                    eprintln!("Error serializing output: {}", e);
                    2u8
                })?;
                print!("{}", rendered);
            } else {
                let rendered = if pretty {
                    serde_json::to_string_pretty(&value)
                } else {
                    serde_json::to_string(&value)
                }
                .map_err(|e| {
                    eprintln!("Error serializing output: {}", e);
                    2u8
                })?;
                println!("{}", rendered);
            }
            Ok(())
        }
        Err(errors) => {
            eprintln!("An example could not be generated because:");
            for message in unique_messages(&errors) {
                eprintln!("  - {}", message);
            }
            Err(1)
        }
    }
}

fn run_inspect(
    source: &str,
    reference: &str,
    stage: &str,
    follow: Option<&str>,
    imports: &[String],
) -> Result<(), u8> {
    let documents = load_documents(source, imports)?;
    let lookup = Lookup::new(&documents);
    let stage = parse_stage(stage)?;

    let (mut schema, mut current_ref) = match lookup.resolve_reference(reference) {
        None => {
            eprintln!("Error: reference not found: {}", reference);
            return Err(1);
        }
        Some(LookupResult::External { reference }) => {
            println!("{}", reference);
            println!("This is an external reference; its schema is not part of the loaded documents.");
            return Ok(());
        }
        Some(LookupResult::Resolved {
            schema,
            base_reference,
        }) => (
            schema,
            base_reference.unwrap_or_else(|| reference.to_string()),
        ),
    };

    let mut path = NavigationPath::new(PathElement::new(
        current_ref.clone(),
        resolve_title(&current_ref, &schema),
    ));

    if let Some(trail) = follow {
        for name in trail.split('.').filter(|s| !s.is_empty()) {
            let property = schema
                .as_object()
                .and_then(|obj| obj.properties.as_ref())
                .and_then(|props| props.get(name));
            let Some(property) = property else {
                eprintln!("Error: no property \"{}\" at {}", name, current_ref);
                return Err(1);
            };
            let document = Reference::parse(&current_ref).document().to_string();
            match lookup.get_schema_at(property, &document) {
                None => {
                    eprintln!(
                        "Error: the reference under \"{}\" could not be resolved",
                        name
                    );
                    return Err(1);
                }
                Some(LookupResult::External { reference }) => {
                    eprintln!("Error: \"{}\" is an external reference: {}", name, reference);
                    return Err(1);
                }
                Some(LookupResult::Resolved {
                    schema: next,
                    base_reference,
                }) => {
                    let next_ref =
                        base_reference.unwrap_or_else(|| property_reference(&current_ref, name));
                    let title = resolve_title(&next_ref, &next);
                    path = path.advance(next_ref.clone(), title);
                    schema = next;
                    current_ref = next_ref;
                }
            }
        }
    }

    let titles: Vec<&str> = path
        .elements()
        .iter()
        .map(|element| element.title.as_str())
        .collect();
    println!("{}", titles.join(" > "));
    println!("{}", path.to_link_segments().join(" "));
    println!();

    print_details(&schema, &current_ref, &lookup, stage);
    Ok(())
}

fn print_details(schema: &SchemaNode, reference: &str, lookup: &Lookup, stage: Stage) {
    let obj = match schema {
        SchemaNode::Boolean(true) => {
            println!("Anything is allowed here.");
            return;
        }
        SchemaNode::Boolean(false) => {
            println!("There is no valid value for this property.");
            return;
        }
        SchemaNode::Object(obj) => obj,
    };

    if let Some(description) = &obj.description {
        println!("{}", description);
        println!();
    } else if obj.is_unconstrained() {
        println!("Anything is allowed here.");
        return;
    }

    let document = Reference::parse(reference).document().to_string();
    let required: &[String] = obj.required.as_deref().unwrap_or(&[]);
    let mut rows: Vec<String> = Vec::new();

    if let Some(properties) = &obj.properties {
        for (name, property) in properties.iter() {
            let resolved = lookup.get_schema_at(property, &document);
            // Unresolvable references stay visible as their raw node.
            let visible = match &resolved {
                Some(result) => result
                    .schema()
                    .map_or(true, |node| should_show_in_stage(stage, node)),
                None => true,
            };
            if !visible {
                continue;
            }
            let display = resolved
                .as_ref()
                .and_then(|result| result.schema())
                .unwrap_or(property);
            let property_ref = resolved
                .as_ref()
                .and_then(|result| result.base_reference())
                .map(str::to_string)
                .unwrap_or_else(|| property_reference(reference, name));

            let mut flags = vec![type_label(display)];
            if required.iter().any(|r| r == name) {
                flags.push("required".to_string());
            }
            if let Some(marker) = display.as_object().and_then(|node| node.stage) {
                flags.push(marker.to_string());
            }
            rows.push(format!("  {} ({}) -> {}", name, flags.join(", "), property_ref));
        }
    }

    if let Some(patterns) = &obj.pattern_properties {
        for (pattern, node) in patterns.iter() {
            let visible = match lookup.get_schema_at(node, &document) {
                Some(result) => result
                    .schema()
                    .map_or(true, |resolved| should_show_in_stage(stage, resolved)),
                None => true,
            };
            if visible {
                rows.push(format!("  /{}/ (keys of pattern)", pattern));
            }
        }
    }

    if let Some(additional) = &obj.additional_properties {
        match additional.as_ref() {
            SchemaNode::Boolean(true) => {
                rows.push(
                    "  Extra properties of any type may be provided to this object.".to_string(),
                );
            }
            SchemaNode::Boolean(false) => {}
            node => {
                let visible = match lookup.get_schema_at(node, &document) {
                    Some(result) => result
                        .schema()
                        .map_or(true, |resolved| should_show_in_stage(stage, resolved)),
                    None => true,
                };
                if visible {
                    rows.push(format!("  Additional Properties ({})", type_label(node)));
                }
            }
        }
    }

    if !rows.is_empty() {
        println!("Properties:");
        for row in &rows {
            println!("{}", row);
        }
    }

    let mut mixins: Vec<String> = Vec::new();
    if let Some(branches) = &obj.all_of {
        mixins.push(format!("allOf ({} branches)", branches.len()));
    }
    if let Some(branches) = &obj.any_of {
        mixins.push(format!("anyOf ({} branches)", branches.len()));
    }
    if let Some(branches) = &obj.one_of {
        mixins.push(format!("oneOf ({} branches)", branches.len()));
    }
    if obj.not.is_some() {
        mixins.push("not".to_string());
    }
    if !mixins.is_empty() {
        if rows.is_empty() {
            println!("This object must match the following conditions:");
        } else {
            println!("This type has all of the properties above, but must also match:");
        }
        for mixin in &mixins {
            println!("  {}", mixin);
        }
    }
}

fn type_label(schema: &SchemaNode) -> String {
    match schema {
        SchemaNode::Boolean(true) => "anything".to_string(),
        SchemaNode::Boolean(false) => "nothing".to_string(),
        SchemaNode::Object(obj) => {
            if let Some(reference) = &obj.reference {
                return format!("$ref: {}", reference);
            }
            if let Some(types) = &obj.schema_type {
                return types.to_string();
            }
            if obj.properties.is_some() {
                return "object".to_string();
            }
            if obj.all_of.is_some() || obj.any_of.is_some() || obj.one_of.is_some() {
                return "composite".to_string();
            }
            if obj.enum_values.is_some() || obj.const_value.is_some() {
                return "literal".to_string();
            }
            "anything".to_string()
        }
    }
}

fn run_validate(source: &str, instance_path: &Path, json_output: bool) -> Result<(), u8> {
    let schema = load_document_auto(source).map_err(|e| {
        report_error(json_output, &format!("loading schema: {}", e));
        e.exit_code() as u8
    })?;
    let instance = load_document(instance_path).map_err(|e| {
        report_error(json_output, &format!("loading instance: {}", e));
        e.exit_code() as u8
    })?;

    match collect_markers(&schema, &instance) {
        Ok(markers) if markers.is_empty() => {
            if json_output {
                println!(r#"{{"valid":true}}"#);
            } else {
                println!("Valid");
            }
            Ok(())
        }
        Ok(markers) => {
            if json_output {
                let output = serde_json::json!({
                    "valid": false,
                    "markers": markers
                });
                println!("{}", output);
            } else {
                eprintln!("Validation failed:");
                for marker in &markers {
                    eprintln!("  {}", marker);
                }
            }
            Err(1)
        }
        Err(e) => {
            report_error(json_output, &e.to_string());
            Err(e.exit_code() as u8)
        }
    }
}

/// Output an error message in plain text or JSON format.
fn report_error(json_output: bool, msg: &str) {
    if json_output {
        println!(r#"{{"valid":false,"error":"{}"}}"#, msg);
    } else {
        eprintln!("Error: {}", msg);
    }
}
