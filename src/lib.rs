pub mod core {
    pub mod config;
    pub mod error;
    pub mod state;
    pub mod tracing_init;
}

pub mod api {
    pub mod client;
}

pub mod models {
    pub mod article;
    pub mod topic;
    pub mod user;
}

pub mod stores {
    pub mod session_store;
    pub mod token_store;
}

pub mod services {
    pub mod auth;
    pub mod bootstrap;
}

pub mod navigation {
    pub mod navigator;
    pub mod route;
}

pub mod guards {
    pub mod auth_guard;
    pub mod guest_guard;
    pub mod outcome;
}

pub mod validation {
    pub mod forms;
}

pub mod views {
    pub mod article_detail;
    pub mod auth_forms;
    pub mod create_article;
    pub mod feed;
    pub mod profile;
    pub mod task;
    pub mod themes;
}
