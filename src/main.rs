//! semquery CLI: look entities up across linked-data SPARQL endpoints.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

use semquery::config::ResolverConfig;
use semquery::endpoint::Endpoint;
use semquery::entity::{Entity, QueryOptions};
use semquery::lang::Language;
use semquery::namespace::{self, NamespaceRegistry};
use semquery::ontology::{Book, CreativeWork, Person, Thing};
use semquery::transport::HttpTransport;

#[derive(Parser)]
#[command(name = "semquery", version, about = "Entity lookup across linked-data SPARQL endpoints")]
struct Cli {
    /// Configuration file (defaults to $XDG_CONFIG_HOME/semquery/config.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up anything by label or URL.
    Thing {
        #[arg(long)]
        label: Option<String>,
        #[command(flatten)]
        lookup: LookupArgs,
    },

    /// Look up a person.
    Person {
        #[arg(long)]
        full_name: Option<String>,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        birth_year: Option<i32>,
        #[arg(long)]
        death_year: Option<i32>,
        #[command(flatten)]
        lookup: LookupArgs,
    },

    /// Look up a creative work.
    Work {
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        author: Option<String>,
        #[arg(long)]
        date: Option<String>,
        /// Resolve the author name to identities before querying the work.
        #[arg(long)]
        author_lookup: bool,
        /// The author is an organisation rather than a person.
        #[arg(long, requires = "author_lookup")]
        author_is_organisation: bool,
        #[command(flatten)]
        lookup: LookupArgs,
    },

    /// Look up a book.
    Book {
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        author: Option<String>,
        #[arg(long)]
        publisher: Option<String>,
        #[arg(long)]
        publication_date: Option<String>,
        #[arg(long)]
        gallica_url: Option<String>,
        /// Resolve the author name to identities before querying the book.
        #[arg(long)]
        author_lookup: bool,
        /// The author is an organisation rather than a person.
        #[arg(long, requires = "author_lookup")]
        author_is_organisation: bool,
        #[command(flatten)]
        lookup: LookupArgs,
    },

    /// Inspect the namespace registry.
    Namespace {
        #[command(subcommand)]
        action: NamespaceAction,
    },

    /// Show or write the configuration.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Options shared by every lookup subcommand.
#[derive(Args)]
struct LookupArgs {
    /// URL of the entity on one of the endpoints.
    #[arg(long)]
    url: Option<String>,

    /// Endpoint to query (dbpedia, dbpedia_fr, wikidata, bnf); may be repeated.
    #[arg(long)]
    endpoint: Vec<Endpoint>,

    /// Query language code (en, fr, de, ...).
    #[arg(long)]
    lang: Option<Language>,

    /// Require strict predicate matching (`--strict false` to loosen).
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    strict: Option<bool>,

    /// Require the candidate to carry the class type.
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    check_type: Option<bool>,

    /// Follow identity links after the first query.
    #[arg(long)]
    deep: bool,

    /// Print the rendered queries instead of submitting them.
    #[arg(long)]
    dry_run: bool,
}

#[derive(Subcommand)]
enum NamespaceAction {
    /// Shorten a full URI to a prefixed token.
    Shorten { uri: String },
    /// Expand a prefixed token to a full URI.
    Expand { token: String },
    /// List registered prefixes.
    List,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration as TOML.
    Show,
    /// Write the default configuration to the config path.
    Init,
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = ResolverConfig::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Commands::Thing { label, lookup } => {
            let mut builder = Thing::builder()
                .query_language(lookup.language(&config))
                .endpoints(lookup.endpoint.iter().copied());
            if let Some(label) = label {
                builder = builder.label(label);
            }
            if let Some(url) = &lookup.url {
                builder = builder.url(url.as_str());
            }
            let mut thing = builder.build()?;
            run(&mut thing, &lookup, &config, QueryOptions::default())?;
        }

        Commands::Person {
            full_name,
            first_name,
            last_name,
            birth_year,
            death_year,
            lookup,
        } => {
            let mut builder = Person::builder()
                .query_language(lookup.language(&config))
                .endpoints(lookup.endpoint.iter().copied());
            if let Some(name) = full_name {
                builder = builder.full_name(name);
            }
            if let Some(name) = first_name {
                builder = builder.first_name(name);
            }
            if let Some(name) = last_name {
                builder = builder.last_name(name);
            }
            if let Some(year) = birth_year {
                builder = builder.birth_year(year);
            }
            if let Some(year) = death_year {
                builder = builder.death_year(year);
            }
            if let Some(url) = &lookup.url {
                builder = builder.url(url.as_str());
            }
            let mut person = builder.build()?;
            run(&mut person, &lookup, &config, QueryOptions::default())?;
        }

        Commands::Work {
            title,
            author,
            date,
            author_lookup,
            author_is_organisation,
            lookup,
        } => {
            let mut builder = CreativeWork::builder()
                .query_language(lookup.language(&config))
                .endpoints(lookup.endpoint.iter().copied());
            if let Some(title) = title {
                builder = builder.title(title);
            }
            if let Some(author) = author {
                builder = builder.author(author);
            }
            if let Some(date) = date {
                builder = builder.date(date);
            }
            if let Some(url) = &lookup.url {
                builder = builder.url(url.as_str());
            }
            let mut work = builder.build()?;
            config.apply(&mut work)?;
            if author_lookup && !lookup.dry_run {
                let transport = config.http_transport();
                if author_is_organisation {
                    work.resolve_author_organisation(&transport)?;
                } else {
                    work.resolve_author(&transport)?;
                }
            }
            run(&mut work, &lookup, &config, CreativeWork::DEFAULT_OPTIONS)?;
        }

        Commands::Book {
            title,
            author,
            publisher,
            publication_date,
            gallica_url,
            author_lookup,
            author_is_organisation,
            lookup,
        } => {
            let mut builder = Book::builder()
                .query_language(lookup.language(&config))
                .endpoints(lookup.endpoint.iter().copied());
            if let Some(title) = title {
                builder = builder.title(title);
            }
            if let Some(author) = author {
                builder = builder.author(author);
            }
            if let Some(publisher) = publisher {
                builder = builder.publisher(publisher);
            }
            if let Some(date) = publication_date {
                builder = builder.publication_date(date);
            }
            if let Some(url) = gallica_url {
                builder = builder.gallica_url(url);
            }
            if let Some(url) = &lookup.url {
                builder = builder.url(url.as_str());
            }
            let mut book = builder.build()?;
            config.apply(&mut book)?;
            if author_lookup && !lookup.dry_run {
                let transport = config.http_transport();
                if author_is_organisation {
                    book.resolve_author_organisation(&transport)?;
                } else {
                    book.resolve_author(&transport)?;
                }
            }
            run(&mut book, &lookup, &config, Book::DEFAULT_OPTIONS)?;
        }

        Commands::Namespace { action } => match action {
            NamespaceAction::Shorten { uri } => println!("{}", namespace::shorten(&uri)),
            NamespaceAction::Expand { token } => match namespace::expand(&token) {
                Some(uri) => println!("{uri}"),
                None => miette::bail!("no registered prefix in \"{token}\""),
            },
            NamespaceAction::List => {
                let registry = NamespaceRegistry::global();
                let prefixes = registry.all();
                println!("Prefixes ({}):", prefixes.len());
                for prefix in &prefixes {
                    println!("  {:<20} {}", prefix.name(), prefix.uri());
                }
                let aliases = registry.aliases();
                if !aliases.is_empty() {
                    println!("Aliases ({}):", aliases.len());
                    for (alias, canonical) in &aliases {
                        println!("  {:<20} -> {}", alias, canonical.name());
                    }
                }
            }
        },

        Commands::Config { action } => match action {
            ConfigAction::Show => {
                let text = toml::to_string_pretty(&config).into_diagnostic()?;
                print!("{text}");
            }
            ConfigAction::Init => {
                let Some(path) = cli.config.or_else(ResolverConfig::default_path) else {
                    miette::bail!("no config path given and no home directory found");
                };
                ResolverConfig::default().save(&path)?;
                println!("Wrote {}", path.display());
            }
        },
    }

    Ok(())
}

impl LookupArgs {
    fn language(&self, config: &ResolverConfig) -> Language {
        self.lang.unwrap_or(config.query_language)
    }
}

/// Query (or with `--dry-run`, render) an entity and print the result as JSON.
///
/// `defaults` are the class's options, overridden by the config and then by
/// the command line.
fn run(
    entity: &mut Entity,
    lookup: &LookupArgs,
    config: &ResolverConfig,
    defaults: QueryOptions,
) -> Result<()> {
    config.apply(entity)?;
    let mut options = config.query_options_or(defaults);
    if let Some(strict) = lookup.strict {
        options.strict_mode = strict;
    }
    if let Some(check_type) = lookup.check_type {
        options.check_type = check_type;
    }

    if lookup.dry_run {
        for (endpoint, text) in entity.rendered_queries(options)? {
            println!("# {}\n{text}\n", endpoint.name());
        }
        return Ok(());
    }

    let transport: HttpTransport = config.http_transport();
    let report = entity.query(&transport, options)?;
    for failure in &report.failed {
        tracing::warn!(endpoint = %failure.endpoint.name(), "no answer: {}", failure.reason);
    }
    if lookup.deep {
        let followed = entity.find_more_about(&transport)?;
        tracing::info!(followed, "identity links followed");
    }

    let output = serde_json::json!({
        "attributes": entity.attributes(),
        "labels": entity.labels(),
    });
    let json = serde_json::to_string_pretty(&output).into_diagnostic()?;
    println!("{json}");
    Ok(())
}
