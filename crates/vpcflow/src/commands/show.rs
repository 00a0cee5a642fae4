use colored::Colorize;
use vpcflow_cloud::{ResourceStatus, StateManager};
use vpcflow_config::Settings;
use vpcflow_core::plan::{ELASTIC_IP, INTERNET_GATEWAY, NAT_GATEWAY, ROUTE_TABLE, SUBNET, VPC};

const SECTIONS: [(&str, &str); 6] = [
    (VPC, "VPC"),
    (INTERNET_GATEWAY, "Internet gateway"),
    (SUBNET, "Subnets"),
    (ELASTIC_IP, "Elastic IPs"),
    (NAT_GATEWAY, "NAT gateways"),
    (ROUTE_TABLE, "Route tables"),
];

pub async fn handle(json: bool) -> anyhow::Result<()> {
    let settings = Settings::load()?;
    let manager = StateManager::new(settings.state_root()?);

    if !manager.exists() {
        println!("{}", "No state recorded yet.".yellow());
        println!("Run `vpcflow apply --yes` to create the network");
        return Ok(());
    }

    let state = manager.load().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&state)?);
        return Ok(());
    }

    println!(
        "State: {}",
        manager.state_path().display().to_string().cyan()
    );
    println!(
        "Region: {}  Updated: {}",
        state.region.as_deref().unwrap_or("-"),
        state.updated_at.to_rfc3339()
    );

    for (resource_type, title) in SECTIONS {
        let resources = state.resources_of_type(resource_type);
        if resources.is_empty() {
            continue;
        }

        println!();
        println!("{}", format!("{} ({}):", title, resources.len()).bold());
        for (name, resource) in resources {
            let status = match resource.status {
                ResourceStatus::Available => "available".green(),
                ResourceStatus::Pending => "incomplete".yellow(),
                ResourceStatus::Unknown => "unknown".dimmed(),
            };
            println!("  • {} {} [{}]", name.cyan(), resource.id, status);
        }
    }

    Ok(())
}
