use ahash::AHashSet;
use clap::Parser;
use rand::Rng;
use rand::rngs::ThreadRng;
use rusqlite::{Connection, Transaction, params};
use shogo::config::{ConnectionVerification, LogVerification, RunConfig};
use shogo::diagram::tags;
use shogo::rules::{COMPOUND_GENERATION_TYPE, COMPOUND_VARIANT_SUFFIX, PORT_UNAVAILABLE_SENTINEL};
use shogo::source::archive::DIAGRAM_ENTRY;
use shogo::source::sqlite::SCHEMA;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

const RUN_ID: &str = "Import Diagram-fixture";
const INPUT_PORT: &str = "IN";

/// A CLI tool to generate a matching database and diagram archive for Shogo
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Directory to write mito.db, diagrams.jar and execution-data.json to
    #[arg(short, long, default_value = "fixture")]
    output: PathBuf,

    /// Number of diagrams to generate
    #[arg(long, default_value_t = 2)]
    diagrams: usize,

    /// Number of blocks per diagram
    #[arg(long, default_value_t = 12)]
    blocks: usize,

    /// Number of inconsistencies to inject
    #[arg(long, default_value_t = 0)]
    corrupt: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Defect {
    /// The log description says the opposite of the mapping table.
    FlippedDescription,
    /// The port is wired the way the other case requires.
    SwappedWiring,
    /// The block has no `diagram_blocks` row.
    MissingBlockRow,
}

/// One generated block and everything written for it.
struct BlockSpec {
    name: String,
    block_type: String,
    target_id: u32,
    direct: bool,
    logged_mapping: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut rng = rand::rng();

    if cli.diagrams == 0 || cli.blocks == 0 {
        eprintln!("Error: --diagrams and --blocks must both be at least 1");
        std::process::exit(1);
    }

    fs::create_dir_all(&cli.output)?;
    println!(
        "Generating {} diagram(s) with {} block(s) each...",
        cli.diagrams, cli.blocks
    );

    let diagram_names: Vec<String> = (1..=cli.diagrams).map(|d| format!("=FX{:02}", d)).collect();
    let defects = pick_defects(&mut rng, &diagram_names, cli.blocks, cli.corrupt);

    let db_path = cli.output.join("mito.db");
    if db_path.exists() {
        fs::remove_file(&db_path)?;
    }
    let mut conn = Connection::open(&db_path)?;
    conn.execute_batch(SCHEMA)?;
    let tx = conn.transaction()?;
    let mut documents = Vec::new();
    for diagram in &diagram_names {
        let blocks = generate_blocks(&mut rng, cli.blocks);
        write_rows(&tx, diagram, &blocks, &defects)?;
        documents.push((diagram.clone(), render_diagram(diagram, &blocks, &defects)));
        println!("-> Generated diagram '{}'.", diagram);
    }
    tx.commit()?;

    write_archive(&cli.output.join("diagrams.jar"), &documents)?;
    write_execution_data(&cli.output, &diagram_names[0])?;

    println!(
        "Successfully wrote fixture to '{}' ({} defect(s) injected)",
        cli.output.display(),
        defects.len()
    );
    Ok(())
}

fn pick_defects(
    rng: &mut ThreadRng,
    diagrams: &[String],
    blocks: usize,
    count: usize,
) -> AHashSet<(Defect, String, usize)> {
    let kinds = [
        Defect::FlippedDescription,
        Defect::SwappedWiring,
        Defect::MissingBlockRow,
    ];
    let capacity = kinds.len() * diagrams.len() * blocks;
    let mut defects = AHashSet::new();
    while defects.len() < count.min(capacity) {
        let kind = kinds[rng.random_range(0..kinds.len())];
        let diagram = diagrams[rng.random_range(0..diagrams.len())].clone();
        defects.insert((kind, diagram, rng.random_range(0..blocks)));
    }
    defects
}

fn generate_blocks(rng: &mut ThreadRng, count: usize) -> Vec<BlockSpec> {
    (0..count)
        .map(|index| BlockSpec {
            name: format!("B{:03}", index),
            block_type: format!("FB{:03}", index),
            // Ids above the default keep the generated-artifact origin visible.
            target_id: rng.random_range(11..100),
            direct: rng.random_bool(0.5),
            logged_mapping: rng.random_bool(0.5),
        })
        .collect()
}

fn has_defect(
    defects: &AHashSet<(Defect, String, usize)>,
    kind: Defect,
    diagram: &str,
    index: usize,
) -> bool {
    defects.contains(&(kind, diagram.to_string(), index))
}

fn write_rows(
    tx: &Transaction<'_>,
    diagram: &str,
    blocks: &[BlockSpec],
    defects: &AHashSet<(Defect, String, usize)>,
) -> rusqlite::Result<()> {
    for (index, block) in blocks.iter().enumerate() {
        let source_port = format!("OUT{:03}", index);
        let interconnection = format!("-\"NOT\"{}\\SRC{:03}.{})", diagram, index, source_port);
        tx.execute(
            "INSERT INTO diagram_parameter
             (diagram_name, block, i_o_name, port_name, block_type, source_port_id, interconnection, variant)
             VALUES (?1, ?2, ?3, ?3, ?4, ?5, ?6, NULL)",
            params![
                diagram,
                block.name,
                INPUT_PORT,
                block.block_type,
                source_port,
                interconnection
            ],
        )?;

        if block.direct {
            tx.execute(
                "INSERT INTO function_mapping_info
                 (source_target_symbol, source_port_id, dest_param_id, generation_type, variant)
                 VALUES (?1, ?2, ?3, 'Function Block', NULL)",
                params![block.block_type, source_port, format!("PARAM{}", block.target_id)],
            )?;
        } else {
            tx.execute(
                "INSERT INTO temp_generated_artifact (block, port) VALUES (?1, ?2)",
                params![block.name, format!("{}{}", INPUT_PORT, block.target_id)],
            )?;
        }

        if block.logged_mapping {
            tx.execute(
                "INSERT INTO function_mapping_info
                 (source_target_symbol, source_port_id, dest_param_id, generation_type, variant)
                 VALUES (?1, ?2, NULL, 'Function Block', NULL)",
                params![block.block_type, INPUT_PORT],
            )?;
        }
        let flipped = has_defect(defects, Defect::FlippedDescription, diagram, index);
        let description = if block.logged_mapping != flipped {
            "Port mapped"
        } else {
            PORT_UNAVAILABLE_SENTINEL
        };
        tx.execute(
            "INSERT INTO log_summary (log_name, diagram_name, mito_block, instance_port, description)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                RUN_ID,
                diagram,
                block.name,
                format!("{}/{}", block.name, INPUT_PORT),
                description
            ],
        )?;

        if !has_defect(defects, Defect::MissingBlockRow, diagram, index) {
            tx.execute(
                "INSERT INTO diagram_blocks (diagram_name, block) VALUES (?1, ?2)",
                params![diagram, block.name],
            )?;
        }
    }

    // One compound component per diagram.
    let compound = format!("CC{}", diagram.trim_start_matches('='));
    let variant = format!("VAR{}", COMPOUND_VARIANT_SUFFIX);
    tx.execute(
        "INSERT INTO diagram_parameter
         (diagram_name, block, i_o_name, port_name, block_type, source_port_id, interconnection, variant)
         VALUES (?1, ?2, 'EN', 'EN', NULL, NULL, NULL, ?3)",
        params![diagram, compound, variant],
    )?;
    tx.execute(
        "INSERT INTO function_mapping_info
         (source_target_symbol, source_port_id, dest_param_id, generation_type, variant)
         VALUES ('CC_TYPE', 'EN', NULL, ?1, ?2)",
        params![COMPOUND_GENERATION_TYPE, variant],
    )?;
    tx.execute(
        "INSERT INTO diagram_blocks (diagram_name, block) VALUES (?1, ?2)",
        params![diagram, compound],
    )?;
    Ok(())
}

fn render_diagram(
    diagram: &str,
    blocks: &[BlockSpec],
    defects: &AHashSet<(Defect, String, usize)>,
) -> String {
    let mut xml = format!("<diagram name=\"{}\">\n", diagram);
    for (index, block) in blocks.iter().enumerate() {
        let direct = block.direct != has_defect(defects, Defect::SwappedWiring, diagram, index);
        let wiring = if direct {
            format!("<{}/>", tags::CONNECTION)
        } else {
            format!(
                "<{sig}><{con}/></{sig}>",
                sig = tags::SIGNAL_DEFINITION,
                con = tags::CONNECTOR
            )
        };
        xml.push_str(&format!(
            "  <{afi}><{name} {item}=\"{block}.NEG.{id}\"/><{port}><{pi}><{pid}>{id}</{pid}></{pi}>{wiring}</{port}></{afi}>\n",
            afi = tags::BLOCK,
            name = tags::NAME,
            item = tags::NAME_ITEM,
            block = block.name,
            id = block.target_id,
            port = tags::PORT,
            pi = tags::PORT_IDENTIFIER,
            pid = tags::PORT_ID,
            wiring = wiring,
        ));
    }
    xml.push_str(&format!(
        "  <{cc}><{name} {item}=\"CC{}\"/></{cc}>\n",
        diagram.trim_start_matches('='),
        cc = tags::COMPOUND,
        name = tags::NAME,
        item = tags::NAME_ITEM,
    ));
    xml.push_str("</diagram>\n");
    xml
}

fn write_archive(
    path: &Path,
    documents: &[(String, String)],
) -> Result<(), Box<dyn std::error::Error>> {
    let mut zip = ZipWriter::new(File::create(path)?);
    let options = SimpleFileOptions::default();
    for (diagram, xml) in documents {
        zip.start_file(format!("{}/{}", diagram, DIAGRAM_ENTRY), options)?;
        zip.write_all(xml.as_bytes())?;
    }
    zip.finish()?;
    Ok(())
}

fn write_execution_data(dir: &Path, diagram: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = RunConfig {
        db_path: Some(dir.join("mito.db")),
        jar_path: Some(dir.join("diagrams.jar")),
        log_verification: Some(LogVerification {
            log_name: RUN_ID.to_string(),
        }),
        connection_verification: Some(ConnectionVerification {
            diagram_name: diagram.to_string(),
        }),
    };
    fs::write(
        dir.join("execution-data.json"),
        serde_json::to_string_pretty(&config)?,
    )?;
    Ok(())
}
