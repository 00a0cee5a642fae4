use colored::Colorize;
use vpcflow_cloud::{ActionType, Plan};
use vpcflow_core::{DefaultRoute, ProvisionOutcome, Topology};

/// Print the fixed topology
pub fn print_topology(topology: &Topology) {
    println!(
        "{} {} ({}) in {}",
        "VPC:".bold(),
        topology.vpc_name.cyan(),
        topology.vpc_cidr,
        topology.region
    );

    println!("{}", format!("Subnets ({}):", topology.subnets.len()).bold());
    for subnet in &topology.subnets {
        println!(
            "  • {} {} {} [{}]",
            subnet.name.cyan(),
            subnet.cidr_block,
            subnet.availability_zone,
            subnet.tier
        );
    }

    println!(
        "{}",
        format!("NAT gateways ({}):", topology.nat_gateways.len()).bold()
    );
    for nat in &topology.nat_gateways {
        println!("  • {} in {}", nat.name.cyan(), nat.subnet);
    }

    println!(
        "{}",
        format!("Route tables ({}):", topology.route_tables.len()).bold()
    );
    for table in &topology.route_tables {
        let route = match &table.default_route {
            DefaultRoute::None => "no default route".to_string(),
            DefaultRoute::InternetGateway => {
                format!("0.0.0.0/0 → {}", topology.internet_gateway_name)
            }
            DefaultRoute::NatGateway(nat) => format!("0.0.0.0/0 → {}", nat),
        };
        println!(
            "  • {} ({}): {}",
            table.name.cyan(),
            route,
            table.subnets.join(", ")
        );
    }
}

fn action_symbol(action_type: ActionType) -> colored::ColoredString {
    match action_type {
        ActionType::Create => "+".green(),
        ActionType::Tag | ActionType::Modify => "~".yellow(),
        ActionType::Attach | ActionType::Associate => "↔".cyan(),
        ActionType::Wait => "…".blue(),
    }
}

/// Print every planned action and the summary line
pub fn print_plan(plan: &Plan) {
    println!("{}", format!("Planned actions ({}):", plan.len()).bold());
    for action in &plan.actions {
        println!("  {} {}", action_symbol(action.action_type), action.description);
    }
    println!();
    println!("{} {}", "Plan:".bold(), plan.summary());
}

/// Print the outcome of an apply run
pub fn print_apply_summary(outcome: &ProvisionOutcome) {
    let report = &outcome.report;
    let inventory = &outcome.inventory;

    println!();
    println!("{}", "Created resources:".bold());
    if let Some(id) = &inventory.vpc_id {
        println!("  VPC              {}", id.cyan());
    }
    if let Some(id) = &inventory.internet_gateway_id {
        println!("  Internet gateway {}", id.cyan());
    }
    for (name, id) in &inventory.subnets {
        println!("  {} {}", name, id.cyan());
    }
    for (name, id) in &inventory.nat_gateways {
        let allocation = inventory
            .elastic_ips
            .get(name)
            .map(|a| format!(" (eip {})", a))
            .unwrap_or_default();
        println!("  {} {}{}", name, id.cyan(), allocation);
    }
    for (name, id) in &inventory.route_tables {
        println!("  {} {}", name, id.cyan());
    }

    if !report.failed.is_empty() {
        println!();
        println!("{}", format!("Failed ({}):", report.failed.len()).red().bold());
        for result in &report.failed {
            println!(
                "  ✗ {}: {}",
                result.action_id,
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    if !report.skipped.is_empty() {
        println!();
        println!(
            "{}",
            format!("Skipped ({}):", report.skipped.len()).yellow().bold()
        );
        for result in &report.skipped {
            println!("  - {}: {}", result.action_id, result.message);
        }
    }

    if !inventory.incomplete.is_empty() {
        println!();
        println!("{}", "Created but not fully configured:".yellow());
        for name in &inventory.incomplete {
            println!("  • {}", name);
        }
    }

    println!();
    let line = format!(
        "{} succeeded, {} failed, {} skipped in {:.1}s",
        report.succeeded.len(),
        report.failed.len(),
        report.skipped.len(),
        report.duration_ms as f64 / 1000.0
    );
    if report.is_success() {
        println!("{} {}", "✓".green().bold(), line);
    } else {
        println!("{} {}", "✗".red().bold(), line);
    }
}
