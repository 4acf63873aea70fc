use anyhow::{bail, Context, Result};
use forum_client::core::config::Config;
use forum_client::core::state::AppState;
use forum_client::core::tracing_init::init_tracing;
use forum_client::navigation::navigator::NavigationEnd;
use forum_client::navigation::route::Route;
use forum_client::validation::forms::{ArticleForm, LoginForm, RegisterForm};
use forum_client::views::article_detail::ArticleDetailView;
use forum_client::views::auth_forms::{submit_login, submit_register};
use forum_client::views::create_article::CreateArticleView;
use forum_client::views::feed::{ArticlesFeed, SortOrder};
use forum_client::views::profile::ProfileView;
use forum_client::views::themes::ThemesView;
use std::env;
use std::path::PathBuf;
use tracing::{debug, info};

const USAGE: &str = "\
Usage: forum-client [--config <path>] <command> [args...]

Commands:
  login <email-or-username> <password>
  register <username> <email> <password>
  logout
  whoami
  feed [date|title|author]
  article <id>
  comment <id> <text...>
  post <topic-id> <title> <content...>
  themes
  subscribe <topic-id>
  unsubscribe <topic-id>
  profile [--username <name>] [--email <email>] [--password <password>]
  goto <path>";

#[derive(Debug)]
enum Command {
    Login { identifier: String, password: String },
    Register { username: String, email: String, password: String },
    Logout,
    Whoami,
    Feed(SortOrder),
    Article(u64),
    Comment { article_id: u64, text: String },
    Post { topic_id: u64, title: String, content: String },
    Themes,
    Subscribe(u64),
    Unsubscribe(u64),
    Profile { username: Option<String>, email: Option<String>, password: Option<String> },
    Goto(String),
}

impl Command {
    fn parse(args: &[String]) -> Result<Self> {
        let (name, rest) = match args.split_first() {
            Some((name, rest)) => (name.as_str(), rest),
            None => bail!("Missing command\n\n{}", USAGE),
        };

        let command = match (name, rest) {
            ("login", [identifier, password]) => Command::Login {
                identifier: identifier.clone(),
                password: password.clone(),
            },
            ("register", [username, email, password]) => Command::Register {
                username: username.clone(),
                email: email.clone(),
                password: password.clone(),
            },
            ("logout", []) => Command::Logout,
            ("whoami", []) => Command::Whoami,
            ("feed", []) => Command::Feed(SortOrder::default()),
            ("feed", [order]) => Command::Feed(order.parse().map_err(anyhow::Error::msg)?),
            ("article", [id]) => Command::Article(parse_id(id)?),
            ("comment", [id, text @ ..]) if !text.is_empty() => Command::Comment {
                article_id: parse_id(id)?,
                text: text.join(" "),
            },
            ("post", [topic_id, title, content @ ..]) if !content.is_empty() => Command::Post {
                topic_id: parse_id(topic_id)?,
                title: title.clone(),
                content: content.join(" "),
            },
            ("themes", []) => Command::Themes,
            ("subscribe", [id]) => Command::Subscribe(parse_id(id)?),
            ("unsubscribe", [id]) => Command::Unsubscribe(parse_id(id)?),
            ("profile", flags) => parse_profile_flags(flags)?,
            ("goto", [path]) => Command::Goto(path.clone()),
            _ => bail!("Invalid command or arguments\n\n{}", USAGE),
        };

        Ok(command)
    }

    /// Route whose guard gates the command, if any
    fn route(&self) -> Option<Route> {
        match self {
            Command::Login { .. } => Some(Route::Login),
            Command::Register { .. } => Some(Route::Register),
            Command::Feed(_) => Some(Route::Articles),
            Command::Article(id) => Some(Route::ArticleDetail(*id)),
            Command::Comment { article_id, .. } => Some(Route::ArticleDetail(*article_id)),
            Command::Post { .. } => Some(Route::CreateArticle),
            Command::Themes | Command::Subscribe(_) => Some(Route::Themes),
            Command::Unsubscribe(_) | Command::Profile { .. } => Some(Route::Profile),
            Command::Logout | Command::Whoami | Command::Goto(_) => None,
        }
    }
}

fn parse_id(value: &str) -> Result<u64> {
    value
        .parse()
        .context(format!("'{}' is not a valid id", value))
}

fn parse_profile_flags(flags: &[String]) -> Result<Command> {
    let mut username = None;
    let mut email = None;
    let mut password = None;

    let mut iter = flags.iter();
    while let Some(flag) = iter.next() {
        let slot = match flag.as_str() {
            "--username" => &mut username,
            "--email" => &mut email,
            "--password" => &mut password,
            other => bail!("Unknown profile option '{}'\n\n{}", other, USAGE),
        };
        let value = iter
            .next()
            .context(format!("Missing value for {}", flag))?;
        *slot = Some(value.clone());
    }

    Ok(Command::Profile {
        username,
        email,
        password,
    })
}

/// Split `--config <path>` from the remaining arguments
fn split_config_flag(args: Vec<String>) -> Result<(PathBuf, Vec<String>)> {
    let mut config_path = PathBuf::from("config.toml");
    let mut rest = Vec::with_capacity(args.len());

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        if arg == "--config" && rest.is_empty() {
            let path = iter.next().context("Missing value for --config")?;
            config_path = PathBuf::from(path);
        } else {
            rest.push(arg);
        }
    }

    Ok((config_path, rest))
}

fn main() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let (config_path, args) = split_config_flag(args)?;
    let command = Command::parse(&args)?;

    // Load and validate configuration
    let config = Config::from_file(&config_path)
        .context(format!(
            "Failed to load configuration from '{}'. \
            If this is your first time running the client, copy config.example.toml to config.toml and adjust the values.",
            config_path.display()
        ))?;

    init_tracing(&config.logging);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build Tokio runtime")?;

    runtime.block_on(async_main(config, config_path, command))
}

async fn async_main(config: Config, config_path: PathBuf, command: Command) -> Result<()> {
    info!(
        config_path = %config_path.display(),
        base_url = %config.api.base_url,
        token_path = %config.storage.token_path.display(),
        "Forum client starting"
    );

    let state = AppState::new(config)?;

    // Restore the persisted session before any guard runs
    state.bootstrap.initialize().await;
    debug!(
        authenticated = state.session.is_authenticated(),
        "Session bootstrap complete"
    );

    if let Some(route) = command.route() {
        match state.navigator.navigate(route.clone()).await {
            NavigationEnd::Arrived(landed) if landed == route => {}
            NavigationEnd::Arrived(landed) => {
                match landed {
                    Route::Login => println!("Not logged in. Run `forum-client login <email-or-username> <password>` first."),
                    other => println!("Already logged in, redirected to {}.", other),
                }
                return Ok(());
            }
            NavigationEnd::Superseded => bail!("Navigation to {} was superseded", route),
            NavigationEnd::RedirectLoop(last) => bail!("Navigation to {} did not settle (last: {})", route, last),
        }
    }

    run(command, &state).await
}

async fn run(command: Command, state: &AppState) -> Result<()> {
    match command {
        Command::Login { identifier, password } => {
            let form = LoginForm {
                email_or_username: identifier,
                password,
            };
            let landing = submit_login(&state.auth, form).await?;
            print_whoami(state);
            println!("Continue at {}", landing);
        }
        Command::Register { username, email, password } => {
            let form = RegisterForm {
                username,
                email,
                password,
            };
            let landing = submit_register(&state.auth, form).await?;
            print_whoami(state);
            println!("Continue at {}", landing);
        }
        Command::Logout => {
            state.auth.logout();
            println!("Logged out.");
        }
        Command::Whoami => print_whoami(state),
        Command::Feed(order) => {
            let feed = ArticlesFeed::new(state.api.clone(), &state.session);
            feed.set_sort(order);
            let articles = feed.load().await?;
            if articles.is_empty() {
                println!("No articles from your subscribed topics.");
            }
            for article in articles {
                println!(
                    "#{} [{}] {} by {} ({})",
                    article.id, article.topic_title, article.title, article.author_name, article.created_at
                );
            }
        }
        Command::Article(id) => {
            let mut view = ArticleDetailView::new(state.api.clone());
            let detail = view.load(id).await?;
            println!(
                "{}\n[{}] by {} ({})\n",
                detail.article.title,
                detail.article.topic_title,
                detail.article.author_name,
                detail.article.created_at
            );
            println!("{}\n", detail.article.content);
            println!("Comments ({}):", detail.comments.len());
            for comment in view.comments() {
                println!("  {}: {}", comment.author_name, comment.content);
            }
        }
        Command::Comment { article_id, text } => {
            let mut view = ArticleDetailView::new(state.api.clone());
            view.load(article_id).await?;
            let comment = view.submit_comment(&text).await?;
            println!("Comment #{} added to article #{}.", comment.id, article_id);
        }
        Command::Post { topic_id, title, content } => {
            let view = CreateArticleView::new(state.api.clone());
            let form = ArticleForm {
                topic_id: Some(topic_id),
                title,
                content,
            };
            let created = view.submit(form).await?;
            println!("Article #{} created: {}", created.article.id, created.article.title);
        }
        Command::Themes => {
            let mut view = ThemesView::new(state.auth.clone());
            view.load().await?;
            for topic in view.topics() {
                let marker = if view.is_subscribed(topic) { "x" } else { " " };
                println!("[{}] #{} {}: {}", marker, topic.id, topic.title, topic.description);
            }
        }
        Command::Subscribe(topic_id) => {
            let mut view = ThemesView::new(state.auth.clone());
            view.load().await?;
            let already = view
                .topics()
                .iter()
                .find(|topic| topic.id == topic_id)
                .map(|topic| view.is_subscribed(topic))
                .unwrap_or(false);
            if already {
                println!("Already subscribed to topic #{}.", topic_id);
            } else {
                view.toggle(topic_id).await?;
                println!("Subscribed to topic #{}.", topic_id);
            }
        }
        Command::Unsubscribe(topic_id) => {
            let mut view = ProfileView::new(state.auth.clone());
            view.unsubscribe(topic_id).await?;
            println!("Unsubscribed from topic #{}.", topic_id);
        }
        Command::Profile { username, email, password } => {
            let mut view = ProfileView::new(state.auth.clone());
            view.open().await?;

            let editing = username.is_some() || email.is_some() || password.is_some();
            if editing {
                if let Some(username) = username {
                    view.form.username = username;
                }
                if let Some(email) = email {
                    view.form.email = email;
                }
                if let Some(password) = password {
                    view.form.password = password;
                }
                view.save().await?;
                println!("Profile updated.");
            }

            if let Some(user) = view.user() {
                println!("{} <{}>", user.username, user.email);
            }
            let subscriptions = view.subscriptions();
            println!("Subscriptions ({}):", subscriptions.len());
            for topic in subscriptions {
                println!("  #{} {}", topic.id, topic.title);
            }
        }
        Command::Goto(path) => {
            let route = Route::parse(&path).context(format!("Unknown route '{}'", path))?;
            match state.navigator.navigate(route).await {
                NavigationEnd::Arrived(landed) => println!("{}", landed),
                NavigationEnd::Superseded => bail!("Navigation was superseded"),
                NavigationEnd::RedirectLoop(last) => bail!("Navigation did not settle (last: {})", last),
            }
        }
    }

    Ok(())
}

fn print_whoami(state: &AppState) {
    match state.session.current_user() {
        Some(user) => println!("Logged in as {} <{}> (id {})", user.username, user.email, user.id),
        None if state.session.is_authenticated() => println!("Token stored, user not verified"),
        None => println!("Not logged in"),
    }
}
