use std::{env, fs, path::PathBuf};

fn output_arg() -> clap::Arg {
    clap::arg!(-o --output <FILE> "Output file (default: stdout)")
        .value_name("FILE")
        .value_parser(clap::value_parser!(PathBuf))
}

fn format_arg() -> clap::Arg {
    clap::arg!(-f --format <FORMAT> "Output format (json, text)")
        .value_name("FORMAT")
        .default_value("json")
        .value_parser(["json", "text"])
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=OUT_DIR");

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let completions_dir = out_dir.join("completions");

    fs::create_dir_all(&completions_dir).unwrap();

    let mut cmd = clap::Command::new("horus")
        .version("1.0.0")
        .author("Horus Contributors")
        .about("Parse research text into articles and finalize article citations")
        .arg(clap::arg!(-v --verbose "Enable debug logging").global(true))
        .subcommand_required(true)
        .subcommand(
            clap::Command::new("parse")
                .about("Parse raw input (multi-article protocol, HTML or plain text) into articles")
                .arg(clap::arg!(<INPUT> "Input file, or '-' for stdin"))
                .arg(format_arg())
                .arg(clap::arg!(--"base-url" <URL> "Address the HTML came from").value_name("URL"))
                .arg(output_arg()),
        )
        .subcommand(
            clap::Command::new("cite")
                .about("Rebuild the source list and link [n] citation markers in article HTML")
                .arg(clap::arg!(<HTML> "Article HTML file, or '-' for stdin"))
                .arg(
                    clap::arg!(-s --sources <FILE> "JSON file holding the source list")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    clap::arg!(--select <URL> "Keep only these source URLs")
                        .action(clap::ArgAction::Append),
                )
                .arg(
                    clap::arg!(--manual <FILE> "File with extra source URLs, one per line")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(output_arg()),
        )
        .subcommand(
            clap::Command::new("extract-json")
                .about("Print the JSON value embedded in a model response")
                .arg(clap::arg!(<INPUT> "Input file, or '-' for stdin")),
        )
        .subcommand(
            clap::Command::new("schema")
                .about("Replace article structured data with the JSON from a model response")
                .arg(clap::arg!(<HTML> "Article HTML file, or '-' for stdin"))
                .arg(
                    clap::arg!(-r --response <FILE> "Model response file holding the corrected JSON-LD")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(output_arg()),
        )
        .subcommand(
            clap::Command::new("import")
                .about("Import posts from a Blogger export feed")
                .arg(clap::arg!(<XML> "Feed XML file, or '-' for stdin"))
                .arg(format_arg())
                .arg(output_arg()),
        )
        .subcommand(
            clap::Command::new("slug")
                .about("Print the URL slug for a title")
                .arg(clap::arg!(<TEXT> "Title to slugify")),
        );

    clap_complete::generate_to(clap_complete::shells::Bash, &mut cmd, "horus", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Zsh, &mut cmd, "horus", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Fish, &mut cmd, "horus", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::PowerShell, &mut cmd, "horus", &completions_dir).unwrap();

    println!(
        "cargo:warning=Shell completions generated in: {}",
        completions_dir.display()
    );
}
