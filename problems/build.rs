use std::{
    env,
    error::Error,
    fs::{self, File},
    io::Write,
    path::PathBuf,
    process,
};

struct ProblemDef {
    /// The code that users know this as. This should remain stable
    /// between releases to facilitate consistent documentation.
    code: String,
    /// The internal name that this error is known as. This makes for
    /// easy reading, but we don't promise that this remains consistent
    /// between releases.
    name: String,
    /// The broad class of the problem (structural, label, literal format...).
    category: String,
    /// A message describing the type of error.
    message: String,
}

fn column<'a>(record: &'a csv::StringRecord, index: usize) -> Result<&'a str, String> {
    record
        .get(index)
        .ok_or_else(|| format!("Record {:?} is not valid at column {}", record, index))
}

fn create_problems() -> Result<(), Box<dyn Error>> {
    // Tell Cargo that if the error definitions change, to rerun this build script.
    println!("cargo:rerun-if-changed=resources/problem-codes.csv");

    let mut src_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    src_path.push("resources");
    src_path.push("problem-codes.csv");

    let src = fs::read_to_string(src_path)
        .map_err(|e| format!("Unable to read 'problem-codes.csv': {}", e))?;
    let src = src.as_bytes();

    // Read the file into the definition (we'll iterate over the structs more than once)
    let mut defs = vec![];
    let mut rdr = csv::Reader::from_reader(src);
    for result in rdr.records() {
        let record = result?;
        defs.push(ProblemDef {
            code: column(&record, 0)?.to_string(),
            name: column(&record, 1)?.to_string(),
            category: column(&record, 2)?.to_string(),
            message: column(&record, 3)?.to_string(),
        });
    }

    // Create the output directory and file problems.rs that will have the definitions
    let mut out_path = PathBuf::from(env::var("OUT_DIR")?);
    fs::create_dir_all(out_path.clone())
        .map_err(|e| format!("Unable to create directory 'problems': {}", e))?;

    out_path.push("problems.rs");
    let mut out =
        File::create(out_path).map_err(|e| format!("Unable to create 'problems.rs': {}", e))?;

    // Create the enumeration definition
    out.write_all(b"#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]\n")?;
    out.write_all(b"pub enum Problem {\n")?;
    for def in &defs {
        out.write_all(format!("    {},\n", def.name).as_bytes())?;
    }
    out.write_all(b"}\n\n")?;

    // Create the function to return information about each definition
    out.write_all(b"impl Problem {\n")?;

    write_accessor(
        &mut out,
        "code",
        "Returns the code for the particular problem as a string.",
        &defs,
        |def| &def.code,
    )?;
    write_accessor(
        &mut out,
        "category",
        "Returns the category (the class of error) for the particular problem.",
        &defs,
        |def| &def.category,
    )?;
    write_accessor(
        &mut out,
        "message",
        "Returns the message for the particular problem as a string.\n    /// The message is constant and does not depend on the particular instance of the problem.",
        &defs,
        |def| &def.message,
    )?;

    out.write_all(b"}\n")?;

    // Finalize the out file
    out.flush()?;

    Ok(())
}

fn write_accessor(
    out: &mut File,
    name: &str,
    doc: &str,
    defs: &[ProblemDef],
    value: fn(&ProblemDef) -> &String,
) -> Result<(), Box<dyn Error>> {
    out.write_all(format!("    /// {}\n", doc).as_bytes())?;
    out.write_all(format!("    pub fn {}(&self) -> &'static str {{\n", name).as_bytes())?;
    out.write_all(b"        match self {\n")?;
    for def in defs {
        out.write_all(
            format!(
                "            Problem::{} => \"{}\",\n",
                def.name,
                value(def)
            )
            .as_bytes(),
        )?;
    }
    out.write_all(b"        }\n")?;
    out.write_all(b"    }\n\n")?;
    Ok(())
}

fn main() {
    if let Err(err) = create_problems() {
        println!("problem generating problems.rs: {}", err);
        process::exit(1);
    }
}
