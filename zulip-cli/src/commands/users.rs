//! User commands.

use clap::Subcommand;
use serde_json::Value;

use zulip_api::NewUser;
use zulip_core::error::ZulipResult;

use super::{prompt, Context};
use crate::OutputFormat;

#[derive(Debug, Subcommand)]
pub enum UsersAction {
    /// List all users in the realm.
    List {
        /// Let the client compute gravatar URLs.
        #[arg(long)]
        client_gravatar: Option<bool>,
    },
    /// Show your own profile.
    Me {
        /// Let the client compute gravatar URLs.
        #[arg(long)]
        client_gravatar: Option<bool>,
    },
    /// Create a new account (administrators only).
    Create {
        /// Email address of the new account.
        #[arg(long)]
        new_email: Option<String>,
        /// Initial password; prompted for without echo if omitted.
        #[arg(long)]
        password: Option<String>,
        #[arg(long)]
        full_name: Option<String>,
        #[arg(long)]
        short_name: Option<String>,
    },
}

pub async fn run(ctx: &Context, action: UsersAction) -> ZulipResult<()> {
    let users = ctx.client.users();

    match action {
        UsersAction::List { client_gravatar } => {
            let gravatar = ctx.flag("Client gravatar", client_gravatar, false)?;
            let members = users.get_all(gravatar).await?;
            print_members(ctx, &members);
        }
        UsersAction::Me { client_gravatar } => {
            let gravatar = ctx.flag("Client gravatar", client_gravatar, false)?;
            let profile = users.get_current(gravatar).await?;
            ctx.print_value("user", &Value::Object(profile));
        }
        UsersAction::Create {
            new_email,
            password,
            full_name,
            short_name,
        } => {
            let user = NewUser {
                email: prompt::text("Email", new_email)?,
                password: prompt::secret("Password", password)?,
                full_name: prompt::text("Full name", full_name)?,
                short_name: prompt::text("Short name", short_name)?,
            };
            users.create(&user).await?;
            ctx.print_done();
        }
    }

    Ok(())
}

fn print_members(ctx: &Context, members: &[Value]) {
    if ctx.format == OutputFormat::Json {
        ctx.print_value("members", &Value::Array(members.to_vec()));
        return;
    }

    let mut table = super::new_table(vec!["ID", "Name", "Email", "Role"]);
    for member in members {
        let id = member
            .get("user_id")
            .map(super::display_value)
            .unwrap_or_default();
        table.add_row(vec![
            id,
            super::str_field(member, "full_name").to_string(),
            super::str_field(member, "email").to_string(),
            role(member).to_string(),
        ]);
    }
    println!("{table}");
    println!("\n{} user(s)", members.len());
}

fn role(member: &Value) -> &'static str {
    let is = |key: &str| member.get(key).and_then(Value::as_bool).unwrap_or(false);
    if is("is_bot") {
        "bot"
    } else if is("is_owner") {
        "owner"
    } else if is("is_admin") {
        "admin"
    } else if is("is_guest") {
        "guest"
    } else {
        "member"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_role() {
        assert_eq!(role(&json!({"is_admin": true})), "admin");
        assert_eq!(role(&json!({"is_admin": true, "is_owner": true})), "owner");
        assert_eq!(role(&json!({"is_bot": true})), "bot");
        assert_eq!(role(&json!({})), "member");
    }
}
