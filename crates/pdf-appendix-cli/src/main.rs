use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use pdf_appendix::{
    Appendix, FontSet, GenerationJob, LayoutSettings, NumberingSystem, ProjectFile, Shaper,
    Template,
};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "pdfa", about = "Appendix bundles for legal filings", version)]
struct Cli {
    /// Log pagination and overlay details
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Extra directories to search for Hebrew fonts
    #[arg(long = "font-dir", global = true)]
    font_dirs: Vec<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a bundle from a main document and its appendices
    Merge {
        #[command(flatten)]
        inputs: Inputs,

        /// Output PDF file
        #[arg(short, long)]
        output: PathBuf,

        /// Also save the inputs and settings as a project file
        #[arg(long)]
        save_project: Option<PathBuf>,
    },

    /// Show where every appendix will land without writing a PDF
    Plan {
        #[command(flatten)]
        inputs: Inputs,
    },

    /// Regenerate a bundle from a saved project file
    Project {
        /// Project JSON file
        input: PathBuf,

        /// Output PDF file
        #[arg(short, long)]
        output: PathBuf,
    },
}

#[derive(Args)]
struct Inputs {
    /// Main document (PDF or image)
    #[arg(short, long)]
    main: PathBuf,

    /// Appendix documents, in order
    #[arg(short, long, num_args = 1..)]
    appendix: Vec<PathBuf>,

    /// Appendix titles, matched to appendices by position
    #[arg(short, long)]
    title: Vec<String>,

    /// Appendix labelling scheme
    #[arg(long, default_value = "hebrew", value_enum)]
    numbering: NumberingArg,

    /// Cover and table of contents style
    #[arg(long, default_value = "classic", value_enum)]
    template: TemplateArg,

    /// Do not stamp the first page of each appendix
    #[arg(long)]
    no_stamp: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum NumberingArg {
    Hebrew,
    Roman,
    Arabic,
}

#[derive(Clone, Copy, ValueEnum)]
enum TemplateArg {
    Classic,
    Modern,
    Minimal,
}

impl From<NumberingArg> for NumberingSystem {
    fn from(arg: NumberingArg) -> Self {
        match arg {
            NumberingArg::Hebrew => Self::Hebrew,
            NumberingArg::Roman => Self::Roman,
            NumberingArg::Arabic => Self::Arabic,
        }
    }
}

impl From<TemplateArg> for Template {
    fn from(arg: TemplateArg) -> Self {
        match arg {
            TemplateArg::Classic => Self::Classic,
            TemplateArg::Modern => Self::Modern,
            TemplateArg::Minimal => Self::Minimal,
        }
    }
}

impl Inputs {
    async fn load(self) -> Result<GenerationJob> {
        if self.title.len() > self.appendix.len() {
            bail!(
                "{} titles given for {} appendices",
                self.title.len(),
                self.appendix.len()
            );
        }

        let main = pdf_appendix::load_source(&self.main)
            .await
            .with_context(|| format!("loading {}", self.main.display()))?;
        let sources = pdf_appendix::load_sources(self.appendix.as_slice()).await?;

        let mut titles = self.title.into_iter();
        let appendices = sources
            .into_iter()
            .map(|source| Appendix::new(titles.next().unwrap_or_default(), source))
            .collect();

        Ok(GenerationJob {
            main,
            appendices,
            settings: LayoutSettings {
                numbering: self.numbering.into(),
                template: self.template.into(),
                stamp_appendices: !self.no_stamp,
            },
        })
    }
}

fn print_plan(job: &GenerationJob, fonts: &FontSet) -> Result<()> {
    let plan = job.plan(fonts, &Shaper::default())?;
    println!("Bundle Plan:");
    println!("  Main document: {} page(s)", job.main.page_count);
    println!("  Table of contents: {} page(s)", plan.toc_pages);
    for (entry, appendix) in plan.entries.iter().zip(&job.appendices) {
        let title = if entry.title.is_empty() {
            appendix.source.name.as_str()
        } else {
            entry.title.as_str()
        };
        println!(
            "  Appendix {}: pages {}-{} ({})",
            entry.label, entry.start_page, entry.end_page, title
        );
    }
    println!("  Total pages: {}", plan.total_pages);
    Ok(())
}

async fn write_bundle(job: GenerationJob, fonts: FontSet, output: &Path) -> Result<()> {
    let appendices = job.appendices.len();
    let bytes = pdf_appendix::generate(job, fonts).await?;
    pdf_appendix::save_pdf(bytes, output).await?;
    println!("Bundled {} appendices → {}", appendices, output.display());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let fonts = FontSet::discover(&cli.font_dirs);

    match cli.command {
        Commands::Merge {
            inputs,
            output,
            save_project,
        } => {
            let job = inputs.load().await?;
            if let Some(path) = save_project {
                ProjectFile::from_job(&job).save(&path).await?;
                println!("Saved project → {}", path.display());
            }
            write_bundle(job, fonts, &output).await?;
        }

        Commands::Plan { inputs } => {
            let job = inputs.load().await?;
            print_plan(&job, &fonts)?;
        }

        Commands::Project { input, output } => {
            let job = ProjectFile::load(&input)
                .await
                .with_context(|| format!("reading project {}", input.display()))?
                .into_job()?;
            print_plan(&job, &fonts)?;
            write_bundle(job, fonts, &output).await?;
        }
    }

    Ok(())
}
