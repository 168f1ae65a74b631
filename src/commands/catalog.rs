//! Read-only catalog commands and account commands

use anyhow::Result;
use clap::Subcommand;
use depthify_integration::{
    format_count, IntegrationClient, Project, ProjectId, ProjectStatus, SignupRequest, UserId,
};

use crate::settings::Settings;

#[derive(Debug, Subcommand)]
pub enum CatalogCommand {
    /// List a user's projects
    Projects {
        /// User whose projects to list; defaults to the configured user
        #[arg(long)]
        user_id: Option<String>,
    },
    /// Show one project
    Project { id: String },
    /// List completed projects from every user
    Gallery,
    /// Check that the backend is reachable
    Health,
    /// Show backend-wide counters
    Stats,
}

#[derive(Debug, Subcommand)]
pub enum AccountCommand {
    /// Check credentials and print the account's user id
    Login {
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account
    Signup {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        email: String,
        #[arg(long)]
        password: String,
    },
}

fn status_label(status: Option<ProjectStatus>) -> &'static str {
    match status {
        Some(ProjectStatus::Uploaded) => "uploaded",
        Some(ProjectStatus::Processing) => "processing",
        Some(ProjectStatus::Completed) => "completed",
        Some(ProjectStatus::Failed) => "failed",
        Some(ProjectStatus::Unknown) | None => "unknown",
    }
}

/// One line of a project listing
fn project_row(project: &Project) -> String {
    let mut row = format!(
        "{:>6}  {:<24}  {:<10}",
        project.id.as_str(),
        project.name.as_deref().unwrap_or("(untitled)"),
        status_label(project.status)
    );
    if let Some(vertices) = project.vertices_count {
        row.push_str(&format!("  {} vertices", format_count(vertices)));
    }
    if let Some(seconds) = project.processing_time {
        row.push_str(&format!("  {}s", seconds));
    }
    row
}

pub fn run_catalog(settings: &Settings, command: CatalogCommand) -> Result<()> {
    let client = IntegrationClient::new(settings.client_config())?;

    match command {
        CatalogCommand::Projects { user_id } => {
            let user_id = user_id.map(UserId::new).unwrap_or_else(|| settings.api.user_id());
            let projects = client.list_projects(user_id.clone()).wait()?;
            if projects.is_empty() {
                println!("No projects for user {}", user_id);
            }
            for project in &projects {
                println!("{}", project_row(project));
            }
        }
        CatalogCommand::Project { id } => {
            let project = client.fetch_project(ProjectId::new(id)).wait()?;
            println!("{}", project_row(&project));
            if let Some(faces) = project.faces_count {
                println!("  Faces:      {}", format_count(faces));
            }
            if let Some(object_type) = &project.object_type {
                println!("  Object type: {}", object_type);
            }
            if let Some(created) = project.created_at {
                println!("  Created:    {}", created.format("%Y-%m-%d %H:%M"));
            }
        }
        CatalogCommand::Gallery => {
            let items = client.gallery().wait()?;
            if items.is_empty() {
                println!("The gallery is empty");
            }
            for item in &items {
                println!("{}  by {}", project_row(&item.project), item.creator);
            }
        }
        CatalogCommand::Health => {
            let health = client.health().wait()?;
            println!(
                "Backend {} ({}) status: {}",
                settings.api.base_url,
                health.version.as_deref().unwrap_or("unknown version"),
                health.status
            );
        }
        CatalogCommand::Stats => {
            let stats = client.stats().wait()?;
            println!("Users:              {}", format_count(stats.total_users));
            println!("Projects:           {}", format_count(stats.total_projects));
            println!("Completed projects: {}", format_count(stats.completed_projects));
            println!("Success rate:       {:.1}%", stats.success_rate);
        }
    }
    Ok(())
}

pub fn run_account(settings: &Settings, command: AccountCommand) -> Result<()> {
    let client = IntegrationClient::new(settings.client_config())?;

    let user = match command {
        AccountCommand::Login { email, password } => client.login(email, password).wait()?,
        AccountCommand::Signup {
            first_name,
            last_name,
            email,
            password,
        } => client
            .signup(SignupRequest {
                first_name,
                last_name,
                email,
                password,
            })
            .wait()?,
    };

    println!("Signed in as {} <{}>", user.display_name(), user.email);
    println!(
        "User id {}; pass --email and --password to convert, or set api.user_id in the settings file, to upload as this user",
        user.id
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(json: &str) -> Project {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn row_includes_metrics_when_present() {
        let row = project_row(&project(
            r#"{"id": 12, "name": "Apple", "status": "completed", "vertices_count": 20000, "processing_time": 4.5}"#,
        ));
        assert!(row.contains("12"));
        assert!(row.contains("Apple"));
        assert!(row.contains("completed"));
        assert!(row.contains("20,000 vertices"));
        assert!(row.ends_with("4.5s"));
    }

    #[test]
    fn row_tolerates_sparse_records() {
        let row = project_row(&project(r#"{"id": "abc"}"#));
        assert!(row.contains("(untitled)"));
        assert!(row.contains("unknown"));
        assert!(!row.contains("vertices"));
    }
}
