mod display;
mod import;

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::info;

use ssq_bayes::{predict, Method, PredictConfig, Profile};
use ssq_db::db::{count_draws, db_path, fetch_all_draws, fetch_last_draws, insert_draw, migrate, open_db};
use ssq_db::models::DrawRecord;
use ssq_db::rusqlite::Connection;
use crate::display::{
    display_draws, display_import_summary, display_pool, display_probabilities, display_top,
};

const DEFAULT_SEED: u64 = 42;

#[derive(Parser)]
#[command(name = "ssq", about = "Estimation bayésienne du Double Color Ball")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Importer les tirages depuis un fichier CSV
    Import {
        /// Chemin vers le fichier CSV
        #[arg(short, long, default_value = "ssq_cwl_data.csv")]
        file: PathBuf,
    },

    /// Afficher le chemin de la base de données
    DbPath,

    /// Lister les derniers tirages
    List {
        /// Nombre de tirages à afficher
        #[arg(short, long, default_value = "10")]
        last: u32,
    },

    /// Prédire le prochain tirage
    Predict(PredictArgs),

    /// Ajouter un tirage manuellement
    Add,
}

#[derive(clap::Args)]
struct PredictArgs {
    /// Fichier TOML de configuration (les options ci-dessous priment)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Méthode : top ou sample
    #[arg(short, long)]
    method: Option<Method>,

    /// Nombre de grilles échantillonnées
    #[arg(short, long)]
    num_sets: Option<usize>,

    /// Prior de Dirichlet des rouges
    #[arg(long)]
    alpha_red: Option<f64>,

    /// Prior de Dirichlet des bleus
    #[arg(long)]
    alpha_blue: Option<f64>,

    /// Seed pour la reproductibilité (défaut : 42)
    #[arg(long)]
    seed: Option<u64>,

    /// Seed tirée au hasard
    #[arg(long, conflicts_with = "seed")]
    no_seed: bool,

    /// N'utiliser que les N derniers tirages
    #[arg(short, long)]
    recent: Option<usize>,

    /// Décroissance temporelle gamma dans ]0, 1]
    #[arg(short, long)]
    decay: Option<f64>,

    /// Coefficient de pénalité de recouvrement
    #[arg(short, long)]
    beta: Option<f64>,

    /// Désactiver la re-sélection de Nash
    #[arg(long)]
    no_nash: bool,

    /// Préréglage (écrase beta, recent et decay)
    #[arg(short, long)]
    profile: Option<Profile>,

    /// Sortie JSON
    #[arg(long)]
    json: bool,
}

impl PredictArgs {
    fn resolve(&self) -> Result<PredictConfig> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => PredictConfig::default(),
        };
        // seed absente du fichier : même défaut que sans fichier
        if config.seed.is_none() {
            config.seed = Some(DEFAULT_SEED);
        }

        if let Some(method) = self.method {
            config.method = method;
        }
        if let Some(n) = self.num_sets {
            config.num_sets = n;
        }
        if let Some(a) = self.alpha_red {
            config.alpha_red = a;
        }
        if let Some(a) = self.alpha_blue {
            config.alpha_blue = a;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if self.no_seed {
            config.seed = None;
        }
        if self.recent.is_some() {
            config.recent = self.recent;
        }
        if self.decay.is_some() {
            config.decay = self.decay;
        }
        if let Some(b) = self.beta {
            config.beta = b;
        }
        if self.no_nash {
            config.nash_enabled = false;
        }
        if let Some(profile) = self.profile {
            config = config.with_profile(profile);
        }
        Ok(config)
    }
}

fn load_config(path: &Path) -> Result<PredictConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible de lire {:?}", path))?;
    PredictConfig::from_toml_str(&raw)
        .with_context(|| format!("Configuration invalide dans {:?}", path))
}

fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("ssq=info,ssq_bayes=info"));

    if std::env::var("SSQ_LOG_JSON").is_ok() {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_writer(io::stderr)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_writer(io::stderr)
            .init();
    }
}

fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();
    let path = db_path();
    let conn = open_db(&path)?;
    migrate(&conn)?;

    match cli.command {
        Command::Import { file } => cmd_import(&conn, &file),
        Command::DbPath => {
            println!("{}", path.display());
            Ok(())
        }
        Command::List { last } => cmd_list(&conn, last),
        Command::Predict(args) => cmd_predict(&conn, &args),
        Command::Add => cmd_add(&conn),
    }
}

fn cmd_import(conn: &Connection, file: &Path) -> Result<()> {
    let result = import::import_csv(conn, file)?;
    info!(inserted = result.inserted, errors = result.errors, "import terminé");
    display_import_summary(&result);
    Ok(())
}

fn cmd_list(conn: &Connection, last: u32) -> Result<()> {
    let n = count_draws(conn)?;
    if n == 0 {
        println!("Base vide. Lancez d'abord : ssq import");
        return Ok(());
    }
    let draws = fetch_last_draws(conn, last)?;
    display_draws(&draws);
    Ok(())
}

fn cmd_predict(conn: &Connection, args: &PredictArgs) -> Result<()> {
    let config = args.resolve()?;
    let history = fetch_all_draws(conn)?;
    if history.is_empty() {
        println!("Base vide : prior uniforme. Lancez d'abord : ssq import");
    }

    let prediction = predict(&history, &config)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&prediction)?);
        return Ok(());
    }

    let model_name = format!(
        "Dirichlet α_rouge={} α_bleu={}{}",
        config.alpha_red,
        config.alpha_blue,
        config.decay.map(|g| format!(" γ={g}")).unwrap_or_default(),
    );
    display_probabilities(&prediction, &model_name);
    display_top(&prediction.top, prediction.next_issue);
    display_pool(&prediction);

    Ok(())
}

fn cmd_add(conn: &Connection) -> Result<()> {
    println!("Ajout d'un tirage manuellement\n");

    let raw_seq = prompt("Numéro du tirage (ex: 2025118) : ")?;
    let sequence_index: i64 = raw_seq
        .parse()
        .with_context(|| format!("Numéro de tirage invalide: '{}'", raw_seq))?;
    let draw_date = import::parse_date(&prompt("Date (AAAA-MM-JJ, vide si inconnue) : ")?)?;

    let reds = prompt_reds()?;
    let blue = prompt_blue()?;

    let draw = DrawRecord::from_numbers(sequence_index, draw_date, &reds, blue)?;
    draw.validate()?;

    println!("\nTirage à insérer :");
    display_draws(&[draw.clone()]);

    let confirm = prompt("\nConfirmer l'insertion ? (o/n) : ")?;
    if confirm.trim().to_lowercase() == "o" {
        let inserted = insert_draw(conn, &draw)?;
        if inserted {
            println!("Tirage inséré avec succès.");
        } else {
            println!("Ce tirage existe déjà (doublon ignoré).");
        }
    } else {
        println!("Insertion annulée.");
    }

    Ok(())
}

fn prompt(msg: &str) -> Result<String> {
    print!("{}", msg);
    io::stdout().flush()?;
    let mut input = String::new();
    let read = io::stdin()
        .read_line(&mut input)
        .context("Erreur de lecture")?;
    if read == 0 {
        bail!("Entrée standard fermée");
    }
    Ok(input.trim().to_string())
}

fn prompt_reds() -> Result<Vec<u8>> {
    loop {
        let input = prompt("6 boules rouges (séparées par des espaces, 1-33) : ")?;
        let nums: Result<Vec<u8>, _> = input.split_whitespace().map(|s| s.parse::<u8>()).collect();
        match nums {
            Ok(v) if v.len() == 6 => {
                let draw = DrawRecord::from_numbers(0, None, &v, 1)?;
                if draw.validate().is_ok() {
                    return Ok(v);
                }
                println!("Numéros invalides (1-33, pas de doublons). Réessayez.");
            }
            _ => println!("Entrez exactement 6 numéros. Réessayez."),
        }
    }
}

fn prompt_blue() -> Result<u8> {
    loop {
        let input = prompt("Boule bleue (1-16) : ")?;
        match input.parse::<u8>() {
            Ok(b) if (1..=16).contains(&b) => return Ok(b),
            _ => println!("Boule bleue invalide (1-16). Réessayez."),
        }
    }
}
