//! AMT activation profile and domain commands

use anyhow::{bail, Context, Result};
use clap::Args;
use orch_lib::chart_values::encode_artifact_file;
use orch_lib::models::{AmtDomain, AmtProfile};
use orch_lib::services::RpsApi;
use std::path::PathBuf;
use tabled::Tabled;

use super::{proceed, CommandContext};
use crate::output::{or_dash, print_field, print_header, print_json, print_rows, print_success, OutputFormat};

const ACTIVATIONS: &[&str] = &["acmactivate", "ccmactivate"];

#[derive(Debug, Clone, Args)]
pub struct AmtProfileArgs {
    /// Profile name
    pub name: String,

    /// Activation mode (acmactivate or ccmactivate)
    #[arg(long, default_value = "ccmactivate")]
    pub activation: String,

    /// AMT admin password
    #[arg(long, env = "ORCH_AMT_PASSWORD", hide_env_values = true)]
    pub amt_password: Option<String>,

    /// MEBx password, required for admin control mode
    #[arg(long, env = "ORCH_MEBX_PASSWORD", hide_env_values = true)]
    pub mebx_password: Option<String>,

    /// Let the service generate the AMT password
    #[arg(long)]
    pub generate_random_password: bool,

    /// Enable DHCP on the device
    #[arg(long)]
    pub dhcp: bool,

    /// Tag attached to the profile
    #[arg(long = "tag")]
    pub tags: Vec<String>,

    /// User consent level (None, KVM or All)
    #[arg(long)]
    pub user_consent: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct AmtDomainArgs {
    /// Domain profile name
    pub name: String,

    /// DNS suffix of the provisioning domain
    #[arg(long)]
    pub domain_suffix: String,

    /// Provisioning certificate (.pfx)
    #[arg(long)]
    pub cert_path: PathBuf,

    /// Certificate password
    #[arg(long, env = "ORCH_AMT_CERT_PASSWORD", hide_env_values = true)]
    pub cert_password: Option<String>,

    /// Certificate storage format
    #[arg(long, default_value = "string")]
    pub cert_format: String,
}

#[derive(Tabled)]
struct AmtProfileRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Activation")]
    activation: String,
    #[tabled(rename = "DHCP")]
    dhcp: bool,
    #[tabled(rename = "Tags")]
    tags: String,
}

#[derive(Tabled)]
struct AmtDomainRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Domain Suffix")]
    suffix: String,
    #[tabled(rename = "Expires")]
    expires: String,
}

/// Build an AMT profile, checking password requirements of the activation mode
pub fn build_amt_profile(args: &AmtProfileArgs) -> Result<AmtProfile> {
    let activation = args.activation.to_lowercase();
    if !ACTIVATIONS.contains(&activation.as_str()) {
        bail!(
            "invalid activation '{}', expected one of: {}",
            args.activation,
            ACTIVATIONS.join(", ")
        );
    }
    if args.amt_password.is_none() && !args.generate_random_password {
        bail!("pass --amt-password or --generate-random-password");
    }
    if activation == "acmactivate" && args.mebx_password.is_none() {
        bail!("admin control mode requires --mebx-password");
    }

    Ok(AmtProfile {
        profile_name: args.name.clone(),
        activation,
        amt_password: args.amt_password.clone(),
        mebx_password: args.mebx_password.clone(),
        generate_random_password: args.generate_random_password,
        generate_random_mebx_password: false,
        dhcp_enabled: args.dhcp,
        tags: args.tags.clone(),
        user_consent: args.user_consent.clone(),
    })
}

/// Build an AMT domain, embedding the certificate as base64
pub fn build_amt_domain(args: &AmtDomainArgs) -> Result<AmtDomain> {
    let cert = encode_artifact_file(&args.cert_path)
        .with_context(|| format!("error reading certificate {}", args.cert_path.display()))?;

    Ok(AmtDomain {
        profile_name: args.name.clone(),
        domain_suffix: args.domain_suffix.clone(),
        provisioning_cert: Some(cert),
        provisioning_cert_storage_format: args.cert_format.clone(),
        provisioning_cert_password: args.cert_password.clone(),
        expiration_date: None,
    })
}

/// List AMT profiles
pub async fn list_profiles(client: &impl RpsApi, ctx: &CommandContext) -> Result<()> {
    let response = client.list_amt_profiles(ctx.project()?).await?;
    let profiles: Vec<AmtProfile> = if proceed(ctx, &response, "error listing amt profiles")? {
        response.json()?
    } else {
        Vec::new()
    };

    match ctx.format {
        OutputFormat::Json => print_json(&profiles)?,
        OutputFormat::Table => {
            let rows: Vec<AmtProfileRow> = profiles
                .iter()
                .map(|p| AmtProfileRow {
                    name: p.profile_name.clone(),
                    activation: p.activation.clone(),
                    dhcp: p.dhcp_enabled,
                    tags: p.tags.join(", "),
                })
                .collect();
            print_rows(rows, "amt profiles");
        }
    }
    Ok(())
}

/// Show one AMT profile
pub async fn get_profile(client: &impl RpsApi, ctx: &CommandContext, name: &str) -> Result<()> {
    let response = client.get_amt_profile(ctx.project()?, name).await?;
    if !proceed(ctx, &response, "error getting amt profile")? {
        return Ok(());
    }
    let profile: AmtProfile = response.json()?;

    match ctx.format {
        OutputFormat::Json => print_json(&profile)?,
        OutputFormat::Table => {
            print_header("AMT Profile");
            print_field("Name", &profile.profile_name);
            print_field("Activation", &profile.activation);
            print_field("DHCP", profile.dhcp_enabled);
            print_field("Random Password", profile.generate_random_password);
            print_field("User Consent", or_dash(profile.user_consent.as_deref()));
            print_field("Tags", or_dash(Some(profile.tags.join(", ").as_str())));
        }
    }
    Ok(())
}

/// Create an AMT profile
pub async fn create_profile(client: &impl RpsApi, ctx: &CommandContext, args: &AmtProfileArgs) -> Result<()> {
    let profile = build_amt_profile(args)?;
    let response = client.create_amt_profile(ctx.project()?, &profile).await?;
    if !proceed(ctx, &response, "error while creating amt profile")? {
        return Ok(());
    }
    print_success(&format!("AMT profile {} created", args.name));
    Ok(())
}

/// Delete an AMT profile
pub async fn delete_profile(client: &impl RpsApi, ctx: &CommandContext, name: &str) -> Result<()> {
    let response = client.delete_amt_profile(ctx.project()?, name).await?;
    if !proceed(ctx, &response, "error deleting amt profile")? {
        return Ok(());
    }
    print_success(&format!("AMT profile {} deleted", name));
    Ok(())
}

/// List AMT domains
pub async fn list_domains(client: &impl RpsApi, ctx: &CommandContext) -> Result<()> {
    let response = client.list_amt_domains(ctx.project()?).await?;
    let domains: Vec<AmtDomain> = if proceed(ctx, &response, "error listing amt domains")? {
        response.json()?
    } else {
        Vec::new()
    };

    match ctx.format {
        // Certificates stay out of listings.
        OutputFormat::Json => {
            let redacted: Vec<AmtDomain> = domains
                .into_iter()
                .map(|d| AmtDomain {
                    provisioning_cert: None,
                    provisioning_cert_password: None,
                    ..d
                })
                .collect();
            print_json(&redacted)?
        }
        OutputFormat::Table => {
            let rows: Vec<AmtDomainRow> = domains
                .iter()
                .map(|d| AmtDomainRow {
                    name: d.profile_name.clone(),
                    suffix: d.domain_suffix.clone(),
                    expires: or_dash(d.expiration_date.as_deref()),
                })
                .collect();
            print_rows(rows, "amt domains");
        }
    }
    Ok(())
}

/// Create an AMT domain
pub async fn create_domain(client: &impl RpsApi, ctx: &CommandContext, args: &AmtDomainArgs) -> Result<()> {
    let domain = build_amt_domain(args)?;
    let response = client.create_amt_domain(ctx.project()?, &domain).await?;
    if !proceed(ctx, &response, "error while creating amt domain")? {
        return Ok(());
    }
    print_success(&format!("AMT domain {} created", args.name));
    Ok(())
}

/// Delete an AMT domain
pub async fn delete_domain(client: &impl RpsApi, ctx: &CommandContext, name: &str) -> Result<()> {
    let response = client.delete_amt_domain(ctx.project()?, name).await?;
    if !proceed(ctx, &response, "error deleting amt domain")? {
        return Ok(());
    }
    print_success(&format!("AMT domain {} deleted", name));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn profile_args() -> AmtProfileArgs {
        AmtProfileArgs {
            name: "ccm-default".to_string(),
            activation: "ccmactivate".to_string(),
            amt_password: Some("P@ssw0rd".to_string()),
            mebx_password: None,
            generate_random_password: false,
            dhcp: true,
            tags: vec!["lab".to_string()],
            user_consent: None,
        }
    }

    #[test]
    fn test_build_ccm_profile() {
        let profile = build_amt_profile(&profile_args()).unwrap();
        assert_eq!(profile.activation, "ccmactivate");
        assert!(profile.dhcp_enabled);
    }

    #[test]
    fn test_acm_needs_mebx_password() {
        let mut args = profile_args();
        args.activation = "ACMactivate".to_string();
        assert!(build_amt_profile(&args).is_err());

        args.mebx_password = Some("mebx".to_string());
        assert_eq!(build_amt_profile(&args).unwrap().activation, "acmactivate");
    }

    #[test]
    fn test_password_or_random_required() {
        let mut args = profile_args();
        args.amt_password = None;
        assert!(build_amt_profile(&args).is_err());
        args.generate_random_password = true;
        assert!(build_amt_profile(&args).is_ok());
    }

    #[test]
    fn test_unknown_activation() {
        let mut args = profile_args();
        args.activation = "activate".to_string();
        assert!(build_amt_profile(&args).is_err());
    }

    #[test]
    fn test_domain_embeds_certificate() {
        let mut cert = tempfile::NamedTempFile::new().unwrap();
        cert.write_all(&[0x30, 0x82, 0x01]).unwrap();

        let args = AmtDomainArgs {
            name: "corp".to_string(),
            domain_suffix: "corp.example.com".to_string(),
            cert_path: cert.path().to_path_buf(),
            cert_password: Some("secret".to_string()),
            cert_format: "string".to_string(),
        };
        let domain = build_amt_domain(&args).unwrap();
        assert_eq!(domain.provisioning_cert.as_deref(), Some("MIIB"));
    }

    #[test]
    fn test_domain_missing_certificate() {
        let args = AmtDomainArgs {
            name: "corp".to_string(),
            domain_suffix: "corp.example.com".to_string(),
            cert_path: PathBuf::from("/nonexistent/cert.pfx"),
            cert_password: None,
            cert_format: "string".to_string(),
        };
        let err = build_amt_domain(&args).unwrap_err();
        assert!(err.to_string().contains("error reading certificate"));
    }
}
