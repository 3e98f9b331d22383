use clap::{Parser, Subcommand};
use dialoguer::{Input, Password};
use dotenvy::dotenv;
use edvisa_cli::{create_admin, seed_students};
use edvisa_db::{MIGRATOR, PgUserRepository, init_db_pool};

#[derive(Parser)]
#[command(name = "edvisa-cli")]
#[command(about = "Edvisa CLI - Administrative tools for the Edvisa API", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new administrator account
    CreateAdmin {
        /// Display name
        #[arg(short = 'n', long)]
        name: Option<String>,

        /// Email address
        #[arg(short = 'e', long)]
        email: Option<String>,

        /// Password (will be prompted securely if not provided)
        #[arg(short = 'p', long)]
        password: Option<String>,
    },
    /// Seed the database with fake student accounts
    SeedStudents {
        /// Number of students to create
        #[arg(short = 'c', long, default_value = "25")]
        count: usize,
    },
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("\n❌ {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let database_url =
        std::env::var("DATABASE_URL").map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?;

    let pool = init_db_pool(&database_url).await?;
    MIGRATOR.run(&pool).await?;
    let users = PgUserRepository::new(pool);

    match cli.command {
        Commands::CreateAdmin {
            name,
            email,
            password,
        } => {
            let name = match name {
                Some(name) => name,
                None => Input::new().with_prompt("Name").interact_text()?,
            };
            let email = match email {
                Some(email) => email,
                None => Input::new().with_prompt("Email address").interact_text()?,
            };
            let password = match password {
                Some(password) => password,
                None => Password::new()
                    .with_prompt("Password")
                    .with_confirmation("Confirm password", "Passwords don't match")
                    .interact()?,
            };

            let admin = create_admin(&users, &name, &email, &password).await?;
            println!("\n✅ Admin created successfully!");
            println!("   Email: {}", admin.email);
            println!("   Name: {}", admin.name);
        }
        Commands::SeedStudents { count } => {
            println!("🌱 Seeding {} students...", count);
            let created = seed_students(&users, count).await?;
            println!("✅ Created {} students", created);
        }
    }

    Ok(())
}
