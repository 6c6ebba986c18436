use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use itertools::Itertools;
use log::*;
use structopt::StructOpt;

use greenthumb::{CatalogFilter, Difficulty, FileBlobStore, Plant, RepoError, SessionManager};

#[derive(Debug, StructOpt)]
#[structopt(name = "greenthumb", about = "Plant care reference with a personal plant list")]
struct Opt {
    /// Directory holding the saved user data
    #[structopt(long, default_value = "~/.config/greenthumb")]
    data_dir: String,
}

const HELP: &str = "\
catalog [query] [easy|medium|hard]   list catalog plants
show <n>                             care details for catalog plant n
register <user> <password>
login <user> <password>
logout
add <n> | remove <n>                 add catalog plant n, remove favorite n
mine [query]                         list my plants
whoami | users | delete | help | quit";

fn main() -> Result<()> {
    pretty_env_logger::init();
    let opt = Opt::from_args();
    let data_dir = shellexpand::full(&opt.data_dir)
        .with_context(|| format!("Data dir {} is invalid", opt.data_dir))?;
    let data_dir = PathBuf::from(data_dir.as_ref());
    debug!("Using data dir {:?}", data_dir);

    let mut repo = SessionManager::open(FileBlobStore::new(data_dir));
    println!("Green Thumb. Type 'help' for commands.");

    let stdin = io::stdin();
    loop {
        print!("{}> ", repo.current_account().map_or("", |a| a.username.as_str()));
        io::stdout().flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let words = line.split_whitespace().collect_vec();
        match words.as_slice() {
            [] => continue,
            ["quit"] | ["exit"] => break,
            ["help"] => println!("{}", HELP),
            command => {
                if let Err(e) = run(&mut repo, command) {
                    debug!("Command failed: {:#}", e);
                    println!("{}", e.user_message());
                }
            },
        }
    }
    // Never leave unsaved edits behind
    repo.logout().with_context(|| "Error saving session on exit")?;
    Ok(())
}

fn run(repo: &mut SessionManager<FileBlobStore>, command: &[&str]) -> Result<(), RepoError> {
    match command {
        ["catalog", rest @ ..] => {
            let filter = parse_filter(rest);
            let hits = repo.search_catalog(&filter);
            if hits.is_empty() {
                println!("No plants match your search");
            }
            for plant in hits {
                let n = catalog_number(repo.catalog(), plant);
                let mark = if repo.is_favorite(plant.id) { "*" } else { " " };
                println!("{}{:>3}. {}", mark, n, row(plant));
            }
        },
        ["show", n] => {
            let plant = catalog_plant(repo, n)?;
            println!("{}", details(plant));
        },
        ["register", user, password] => {
            repo.register(user, password)?;
            println!("Welcome, {}", user);
        },
        ["register", ..] | ["login", ..] if command.len() < 3 => {
            return Err(RepoError::EmptyField("username or password"));
        },
        ["login", user, password] => {
            let account = repo.login(user, password)?;
            println!("Hello {}, you have {} plant(s)", account.username, account.favorite_plants.len());
        },
        ["logout"] => repo.logout()?,
        ["add", n] => {
            let id = catalog_plant(repo, n)?.id;
            if !repo.add_favorite_by_id(id)? {
                println!("Already in your plants");
            }
        },
        ["remove", n] => {
            let id = index(n, repo.favorites().len())
                .map(|i| repo.favorites()[i].id)
                .ok_or_else(|| RepoError::NotFound(format!("favorite {}", n)))?;
            repo.remove_favorite(id)?;
        },
        ["mine", rest @ ..] => {
            if !repo.is_authenticated() {
                return Err(RepoError::NoActiveSession);
            }
            let query = rest.join(" ");
            for (i, plant) in repo.favorites().iter().enumerate().filter(|(_, p)| p.matches(&query)) {
                println!("{:>3}. {}", i + 1, row(plant));
            }
        },
        ["whoami"] => match repo.current_account() {
            Some(a) => println!("{} ({} plants)", a.username, a.favorite_plants.len()),
            None => println!("Not logged in"),
        },
        ["users"] => println!("{}", repo.list_usernames().iter().join(", ")),
        ["delete"] => {
            repo.delete_account()?;
            println!("Account deleted");
        },
        _ => println!("Unknown command, try 'help'"),
    }
    Ok(())
}

fn parse_filter(words: &[&str]) -> CatalogFilter {
    let mut filter = CatalogFilter::default();
    let mut query = vec![];
    for word in words {
        match word.parse::<Difficulty>() {
            Ok(d) => filter.difficulty = Some(d),
            Err(_) => query.push(*word),
        }
    }
    filter.query = query.join(" ");
    filter
}

/// 1-based user input to a 0-based index below `len`.
fn index(n: &str, len: usize) -> Option<usize> {
    n.parse::<usize>().ok()
        .filter(|n| (1..=len).contains(n))
        .map(|n| n - 1)
}

fn catalog_plant<'a>(repo: &'a SessionManager<FileBlobStore>, n: &str) -> Result<&'a Plant, RepoError> {
    index(n, repo.catalog().len())
        .map(|i| &repo.catalog()[i])
        .ok_or_else(|| RepoError::NotFound(format!("plant {}", n)))
}

fn catalog_number(catalog: &[Plant], plant: &Plant) -> usize {
    catalog.iter().position(|p| p.id == plant.id).map_or(0, |i| i + 1)
}

fn row(plant: &Plant) -> String {
    format!("{} ({}) [{}] water: {}",
        plant.name,
        plant.scientific_name,
        plant.difficulty.label(),
        plant.care_instructions.water_frequency)
}

fn details(plant: &Plant) -> String {
    let care = &plant.care_instructions;
    [
        format!("{} ({})", plant.name, plant.scientific_name),
        plant.description.clone(),
        format!("Difficulty:    {}", plant.difficulty.label()),
        format!("Water:         {}", care.water_frequency),
        format!("Sunlight:      {}", care.sunlight),
        format!("Temperature:   {}", care.temperature),
        format!("Humidity:      {}", care.humidity),
        format!("Soil:          {}", care.soil),
        format!("Fertilization: {}", care.fertilization),
        format!("Pruning:       {}", care.pruning),
    ].iter().join("\n")
}
