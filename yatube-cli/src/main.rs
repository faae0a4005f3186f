use clap::Parser;
use uuid::Uuid;
use yatube_client::{DEFAULT_TOKEN_FILE, Feed, YatubeClient};

#[derive(Parser, Debug)]
#[clap(about = "Command line client for the Yatube API")]
struct Cli {
    #[clap(short, long, env = "YATUBE_SERVER", default_value = "http://127.0.0.1:8080")]
    server: String,

    /// How many characters of each post to print in feeds.
    #[clap(long, env = "POST_PREVIEW_CHARS", default_value_t = 15)]
    preview: usize,

    #[clap(long, default_value = DEFAULT_TOKEN_FILE)]
    token_file: String,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Parser, Debug)]
enum Command {
    Register {
        #[clap(long)]
        username: String,
        #[clap(long)]
        email: String,
        #[clap(long)]
        password: String,
    },
    Login {
        #[clap(long)]
        username: String,
        #[clap(long)]
        password: String,
    },
    /// Newest posts across the site.
    Feed {
        #[clap(long, default_value_t = 1)]
        page: i64,
    },
    /// Posts of a single group.
    Group {
        slug: String,
        #[clap(long, default_value_t = 1)]
        page: i64,
    },
    /// Posts written by a user.
    Profile {
        username: String,
        #[clap(long, default_value_t = 1)]
        page: i64,
    },
    Show {
        id: Uuid,
    },
    Create {
        #[clap(long)]
        text: String,
        #[clap(long)]
        group: Option<String>,
    },
    Edit {
        id: Uuid,
        #[clap(long)]
        text: String,
        #[clap(long)]
        group: Option<String>,
    },
    Groups,
    CreateGroup {
        #[clap(long)]
        title: String,
        #[clap(long)]
        slug: String,
        #[clap(long, default_value = "")]
        description: String,
    },
    DeleteGroup {
        slug: String,
    },
}

fn print_feed(feed: &Feed, preview: usize) {
    for post in &feed.posts {
        let group = post.group.as_deref().unwrap_or("-");
        println!(
            "- [{}] {} {} ({}, {})",
            post.id,
            post.author,
            post.preview(preview),
            group,
            post.pub_date.format("%Y-%m-%d %H:%M")
        );
    }
    println!("{}", feed.page);
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Cli::parse();

    let mut client = YatubeClient::connect(&args.server)?.with_token_file(&args.token_file);

    match args.command {
        Command::Register {
            username,
            email,
            password,
        } => {
            client.register(&username, &email, &password).await?;
            println!("Successfully registered!");
        }
        Command::Login { username, password } => {
            client.login(&username, &password).await?;
            println!("Successfully logged in!");
        }
        Command::Feed { page } => {
            let feed = client.global_feed(page).await?;
            print_feed(&feed, args.preview);
        }
        Command::Group { slug, page } => {
            let feed = client.group_feed(&slug, page).await?;
            println!("{}", feed.group);
            if !feed.group.description.is_empty() {
                println!("{}", feed.group.description);
            }
            print_feed(&feed.feed, args.preview);
        }
        Command::Profile { username, page } => {
            let profile = client.profile(&username, page).await?;
            println!(
                "{} ({} posts)",
                profile.author.username, profile.author.posts_count
            );
            print_feed(&profile.feed, args.preview);
        }
        Command::Show { id } => {
            let post = client.get_post(id).await?;
            println!("{}", post);
        }
        Command::Create { text, group } => {
            let post = client.create_post(&text, group.as_deref()).await?;
            println!("Post created! ID: {}", post.id);
        }
        Command::Edit { id, text, group } => {
            let post = client.edit_post(id, &text, group.as_deref()).await?;
            println!("Post updated: {}", post);
        }
        Command::Groups => {
            for group in client.list_groups().await? {
                println!("- {}", group);
            }
        }
        Command::CreateGroup {
            title,
            slug,
            description,
        } => {
            let group = client.create_group(&title, &slug, &description).await?;
            println!("Group created: {}", group);
        }
        Command::DeleteGroup { slug } => {
            client.delete_group(&slug).await?;
            println!("Group deleted!");
        }
    }

    Ok(())
}
