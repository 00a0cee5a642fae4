use crate::utils;
use colored::Colorize;
use vpcflow_core::Topology;

pub fn handle(topology: &Topology) -> anyhow::Result<()> {
    println!("{}", "Validating topology...".blue());
    topology.validate()?;
    println!("{}", "✓ Topology is valid".green());

    println!();
    utils::print_topology(topology);

    println!();
    utils::print_plan(&topology.plan());

    Ok(())
}
