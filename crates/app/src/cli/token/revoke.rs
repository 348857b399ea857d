use clap::Args;
use prestige_app::auth::{AdminTokenUuid, KvAuthService};
use uuid::Uuid;

#[derive(Debug, Args)]
pub(crate) struct RevokeTokenArgs {
    /// Token UUID to revoke
    #[arg(long)]
    token_uuid: Uuid,
}

pub(crate) async fn run(service: &KvAuthService, args: RevokeTokenArgs) -> Result<(), String> {
    let revoked = service
        .revoke_admin_token(AdminTokenUuid::from_uuid(args.token_uuid))
        .await
        .map_err(|error| format!("failed to revoke token: {error}"))?;

    if revoked {
        println!("revoked token {}", args.token_uuid);
    } else {
        println!("token {} was already revoked", args.token_uuid);
    }

    Ok(())
}
