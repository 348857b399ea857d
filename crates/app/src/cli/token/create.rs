use clap::Args;
use prestige_app::auth::KvAuthService;

#[derive(Debug, Args)]
pub(crate) struct CreateTokenArgs {
    /// Who or what the token is for
    #[arg(long)]
    label: String,
}

pub(crate) async fn run(service: &KvAuthService, args: CreateTokenArgs) -> Result<(), String> {
    if args.label.trim().is_empty() {
        return Err("label cannot be empty".to_string());
    }

    let issued = service
        .issue_admin_token(&args.label)
        .await
        .map_err(|error| format!("failed to create token: {error}"))?;

    println!("token_uuid: {}", issued.record.uuid);
    println!("token_label: {}", issued.record.label);
    println!("token_version: {}", issued.record.version.as_i16());
    println!("token_created_at: {}", issued.record.created_at);
    println!("admin_token: {}", issued.token);
    println!("store this token now; it is only shown once");

    Ok(())
}
