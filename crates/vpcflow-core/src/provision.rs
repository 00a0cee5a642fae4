//! The provisioning pipeline
//!
//! Five stages run strictly in order, one control-plane call at a time:
//!
//! 1. VPC (create, tag, DNS support, DNS hostnames)
//! 2. Internet gateway (create, tag, attach)
//! 3. Subnets (create, tag, public IP on launch for the public tier)
//! 4. NAT gateways (elastic IP, create, tag, wait until available)
//! 5. Route tables (create, tag, default route, subnet associations)
//!
//! A failed call is recorded and the run moves on. Calls whose inputs were
//! never produced are recorded as skipped rather than attempted; when the
//! VPC itself is missing nothing else is attempted at all. Nothing is
//! retried or rolled back.

use crate::error::{CoreError, Result};
use crate::inventory::Inventory;
use crate::plan::{ELASTIC_IP, INTERNET_GATEWAY, NAT_GATEWAY, ROUTE_TABLE, SUBNET, VPC, ids};
use crate::topology::{DEFAULT_ROUTE_CIDR, DefaultRoute, Topology};
use std::future::Future;
use std::time::{Duration, Instant};
use vpcflow_cloud::{
    ApplyResult, NetworkProvider, ResourceTag, RouteTarget, StateManager, VpcDnsAttribute,
};

/// Default upper bound for each NAT gateway wait
pub const DEFAULT_NAT_WAIT_TIMEOUT: Duration = Duration::from_secs(600);

/// Stage titles, in execution order
pub const STAGES: [&str; 5] = [
    "VPC",
    "Internet gateway",
    "Subnets",
    "NAT gateways",
    "Route tables",
];

/// Progress notifications emitted while a run executes
#[derive(Debug, Clone, Copy)]
pub enum ProvisionEvent<'a> {
    StageStarted {
        number: usize,
        total: usize,
        title: &'a str,
    },
    Created {
        resource_type: &'a str,
        name: &'a str,
        id: &'a str,
    },
    Completed {
        action_id: &'a str,
        message: &'a str,
    },
    /// About to block on a NAT gateway becoming available
    WaitStarted { name: &'a str, id: &'a str },
    Failed {
        action_id: &'a str,
        error: &'a str,
    },
    Skipped {
        action_id: &'a str,
        reason: &'a str,
    },
}

/// Receives progress events
pub trait Reporter {
    fn report(&mut self, event: ProvisionEvent<'_>);
}

/// Reporter that forwards events to `tracing`
#[derive(Debug, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn report(&mut self, event: ProvisionEvent<'_>) {
        match event {
            ProvisionEvent::StageStarted {
                number,
                total,
                title,
            } => tracing::info!("[{}/{}] {}", number, total, title),
            ProvisionEvent::Created {
                resource_type,
                name,
                id,
            } => tracing::info!("Created {} {} ({})", resource_type, name, id),
            ProvisionEvent::Completed { message, .. } => tracing::info!("{}", message),
            ProvisionEvent::WaitStarted { name, id } => {
                tracing::info!("Waiting for {} ({}) to become available", name, id)
            }
            ProvisionEvent::Failed { action_id, error } => {
                tracing::error!("{} failed: {}", action_id, error)
            }
            ProvisionEvent::Skipped { action_id, reason } => {
                tracing::warn!("{} skipped: {}", action_id, reason)
            }
        }
    }
}

/// What a run produced
#[derive(Debug, Clone)]
pub struct ProvisionOutcome {
    pub inventory: Inventory,
    pub report: ApplyResult,
}

impl ProvisionOutcome {
    pub fn is_success(&self) -> bool {
        self.report.is_success()
    }

    /// Fails with [`CoreError::Incomplete`] unless every planned action succeeded
    pub fn ensure_complete(&self) -> Result<()> {
        if self.is_success() {
            return Ok(());
        }
        Err(CoreError::Incomplete {
            failed: self.report.failed.len(),
            skipped: self.report.skipped.len(),
        })
    }

    /// Write the inventory to the state file.
    ///
    /// A run that created nothing leaves any existing state file untouched
    /// and returns `false`.
    pub async fn save_state(
        &self,
        manager: &StateManager,
        topology: &Topology,
    ) -> vpcflow_cloud::Result<bool> {
        if self.inventory.is_empty() {
            tracing::debug!("Nothing was created, leaving state file untouched");
            return Ok(false);
        }
        manager.save(&self.inventory.to_state(topology)).await?;
        Ok(true)
    }
}

/// Drives a [`NetworkProvider`] through the topology's stages
pub struct Provisioner<P> {
    provider: P,
    topology: Topology,
    nat_wait_timeout: Duration,
}

impl<P: NetworkProvider> Provisioner<P> {
    pub fn new(provider: P, topology: Topology) -> Self {
        Self {
            provider,
            topology,
            nat_wait_timeout: DEFAULT_NAT_WAIT_TIMEOUT,
        }
    }

    pub fn with_nat_wait_timeout(mut self, timeout: Duration) -> Self {
        self.nat_wait_timeout = timeout;
        self
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// Execute every stage once
    pub async fn run<R: Reporter + ?Sized>(&self, reporter: &mut R) -> ProvisionOutcome {
        let start = Instant::now();
        let plan = self.topology.plan();

        tracing::debug!(
            "Provisioning {} in {} via {} ({} actions)",
            self.topology.vpc_name,
            self.provider.region(),
            self.provider.display_name(),
            plan.len()
        );

        let mut run = Run {
            provider: &self.provider,
            topology: &self.topology,
            reporter,
            nat_wait_timeout: self.nat_wait_timeout,
            inventory: Inventory::new(),
            report: ApplyResult::new(),
        };

        run.vpc().await;
        if run.inventory.vpc_id.is_some() {
            run.internet_gateway().await;
            run.subnets().await;
            run.nat_gateways().await;
            run.route_tables().await;
        } else {
            let reason = format!("VPC {} was not created", self.topology.vpc_name);
            let unreached: Vec<String> = plan
                .actions
                .iter()
                .filter(|a| !run.report.contains(&a.id))
                .map(|a| a.id.clone())
                .collect();
            run.skip_all(unreached, &reason);
        }

        let Run {
            inventory,
            mut report,
            ..
        } = run;
        report.duration_ms = start.elapsed().as_millis() as u64;

        ProvisionOutcome { inventory, report }
    }
}

/// State of one in-flight run
struct Run<'a, P, R: ?Sized> {
    provider: &'a P,
    topology: &'a Topology,
    reporter: &'a mut R,
    nat_wait_timeout: Duration,
    inventory: Inventory,
    report: ApplyResult,
}

impl<P: NetworkProvider, R: Reporter + ?Sized> Run<'_, P, R> {
    fn stage(&mut self, number: usize) {
        self.reporter.report(ProvisionEvent::StageStarted {
            number,
            total: STAGES.len(),
            title: STAGES[number - 1],
        });
    }

    /// Await a provider call, recording a failure if it errors
    async fn attempt<T, F>(&mut self, action_id: &str, call: F) -> Option<T>
    where
        F: Future<Output = vpcflow_cloud::Result<T>>,
    {
        match call.await {
            Ok(value) => Some(value),
            Err(e) => {
                let error = e.to_string();
                self.reporter.report(ProvisionEvent::Failed {
                    action_id,
                    error: &error,
                });
                self.report.add_failure(action_id.to_string(), error);
                None
            }
        }
    }

    fn completed(&mut self, action_id: String, message: String) {
        self.reporter.report(ProvisionEvent::Completed {
            action_id: &action_id,
            message: &message,
        });
        self.report.add_success(action_id, message);
    }

    fn skip(&mut self, action_id: String, reason: &str) {
        self.reporter.report(ProvisionEvent::Skipped {
            action_id: &action_id,
            reason,
        });
        self.report.add_skipped(action_id, reason.to_string());
    }

    fn skip_all(&mut self, action_ids: impl IntoIterator<Item = String>, reason: &str) {
        for action_id in action_ids {
            self.skip(action_id, reason);
        }
    }

    async fn create<F>(
        &mut self,
        resource_type: &'static str,
        name: &str,
        call: F,
    ) -> Option<String>
    where
        F: Future<Output = vpcflow_cloud::Result<String>>,
    {
        let action_id = ids::create(resource_type, name);
        let id = self.attempt(&action_id, call).await?;
        self.reporter.report(ProvisionEvent::Created {
            resource_type,
            name,
            id: &id,
        });
        self.report
            .add_success(action_id, format!("Created {} {} ({})", resource_type, name, id));
        Some(id)
    }

    async fn step<F>(&mut self, action_id: String, message: String, call: F) -> bool
    where
        F: Future<Output = vpcflow_cloud::Result<()>>,
    {
        if self.attempt(&action_id, call).await.is_some() {
            self.completed(action_id, message);
            true
        } else {
            false
        }
    }

    async fn tag(&mut self, resource_type: &str, name: &str, id: &str) {
        let provider = self.provider;
        let tags = [ResourceTag::name(name)];
        let tagged = self
            .step(
                ids::tag(resource_type, name),
                format!("Tagged {} Name={}", id, name),
                provider.create_tags(id, &tags),
            )
            .await;
        if !tagged {
            self.inventory.mark_incomplete(name);
        }
    }

    async fn vpc(&mut self) {
        let (provider, topology) = (self.provider, self.topology);
        let name = topology.vpc_name.as_str();
        self.stage(1);

        let Some(vpc_id) = self
            .create(VPC, name, provider.create_vpc(&topology.vpc_cidr))
            .await
        else {
            return;
        };
        self.inventory.vpc_id = Some(vpc_id.clone());
        self.tag(VPC, name, &vpc_id).await;

        for attribute in [VpcDnsAttribute::Support, VpcDnsAttribute::Hostnames] {
            let enabled = self
                .step(
                    ids::vpc_dns(name, attribute),
                    format!("Enabled {} on {}", attribute, vpc_id),
                    provider.enable_vpc_dns(&vpc_id, attribute),
                )
                .await;
            if !enabled {
                self.inventory.mark_incomplete(name);
            }
        }
    }

    async fn internet_gateway(&mut self) {
        let (provider, topology) = (self.provider, self.topology);
        let name = topology.internet_gateway_name.as_str();
        self.stage(2);

        let Some(vpc_id) = self.inventory.vpc_id.clone() else {
            return;
        };
        let Some(igw_id) = self
            .create(INTERNET_GATEWAY, name, provider.create_internet_gateway())
            .await
        else {
            let reason = format!("internet gateway {} was not created", name);
            self.skip_all([ids::tag(INTERNET_GATEWAY, name), ids::attach(name)], &reason);
            return;
        };
        self.inventory.internet_gateway_id = Some(igw_id.clone());
        self.tag(INTERNET_GATEWAY, name, &igw_id).await;

        let attached = self
            .step(
                ids::attach(name),
                format!("Attached {} to {}", igw_id, vpc_id),
                provider.attach_internet_gateway(&igw_id, &vpc_id),
            )
            .await;
        if !attached {
            self.inventory.mark_incomplete(name);
        }
    }

    async fn subnets(&mut self) {
        let (provider, topology) = (self.provider, self.topology);
        self.stage(3);

        let Some(vpc_id) = self.inventory.vpc_id.clone() else {
            return;
        };
        for subnet in &topology.subnets {
            let name = subnet.name.as_str();
            let Some(subnet_id) = self
                .create(
                    SUBNET,
                    name,
                    provider.create_subnet(&vpc_id, &subnet.cidr_block, &subnet.availability_zone),
                )
                .await
            else {
                let reason = format!("subnet {} was not created", name);
                let mut followups = vec![ids::tag(SUBNET, name)];
                if subnet.is_public() {
                    followups.push(ids::public_ip(name));
                }
                self.skip_all(followups, &reason);
                continue;
            };
            self.inventory
                .subnets
                .insert(name.to_string(), subnet_id.clone());
            self.tag(SUBNET, name, &subnet_id).await;

            if subnet.is_public() {
                let enabled = self
                    .step(
                        ids::public_ip(name),
                        format!("Enabled MapPublicIpOnLaunch on {}", name),
                        provider.enable_public_ip_on_launch(&subnet_id),
                    )
                    .await;
                if !enabled {
                    self.inventory.mark_incomplete(name);
                }
            }
        }
    }

    async fn nat_gateways(&mut self) {
        let (provider, topology) = (self.provider, self.topology);
        let max_wait = self.nat_wait_timeout;
        self.stage(4);

        for nat in &topology.nat_gateways {
            let name = nat.name.as_str();

            let Some(subnet_id) = self.inventory.subnets.get(&nat.subnet).cloned() else {
                let reason = format!("subnet {} was not created", nat.subnet);
                self.skip_all(
                    [
                        ids::elastic_ip(name),
                        ids::create(NAT_GATEWAY, name),
                        ids::tag(NAT_GATEWAY, name),
                        ids::wait(name),
                    ],
                    &reason,
                );
                continue;
            };

            let eip_action = ids::elastic_ip(name);
            let Some(eip) = self
                .attempt(&eip_action, provider.allocate_elastic_ip())
                .await
            else {
                let reason = format!("no elastic IP was allocated for {}", name);
                self.skip_all(
                    [
                        ids::create(NAT_GATEWAY, name),
                        ids::tag(NAT_GATEWAY, name),
                        ids::wait(name),
                    ],
                    &reason,
                );
                continue;
            };
            self.reporter.report(ProvisionEvent::Created {
                resource_type: ELASTIC_IP,
                name,
                id: &eip.allocation_id,
            });
            self.report.add_success(
                eip_action,
                format!(
                    "Allocated elastic IP {} ({}) for {}",
                    eip.allocation_id,
                    eip.public_ip.as_deref().unwrap_or("-"),
                    name
                ),
            );
            self.inventory
                .elastic_ips
                .insert(name.to_string(), eip.allocation_id.clone());

            let Some(nat_id) = self
                .create(
                    NAT_GATEWAY,
                    name,
                    provider.create_nat_gateway(&subnet_id, &eip.allocation_id),
                )
                .await
            else {
                let reason = format!("NAT gateway {} was not created", name);
                self.skip_all([ids::tag(NAT_GATEWAY, name), ids::wait(name)], &reason);
                continue;
            };
            self.inventory
                .nat_gateways
                .insert(name.to_string(), nat_id.clone());
            self.tag(NAT_GATEWAY, name, &nat_id).await;

            self.reporter
                .report(ProvisionEvent::WaitStarted { name, id: &nat_id });
            let available = self
                .step(
                    ids::wait(name),
                    format!("NAT gateway {} ({}) is available", name, nat_id),
                    provider.wait_nat_gateway_available(&nat_id, max_wait),
                )
                .await;
            if !available {
                self.inventory.mark_incomplete(name);
            }
        }
    }

    async fn route_tables(&mut self) {
        let (provider, topology) = (self.provider, self.topology);
        self.stage(5);

        let Some(vpc_id) = self.inventory.vpc_id.clone() else {
            return;
        };
        for table in &topology.route_tables {
            let name = table.name.as_str();
            let has_route = table.default_route != DefaultRoute::None;

            let Some(rtb_id) = self
                .create(ROUTE_TABLE, name, provider.create_route_table(&vpc_id))
                .await
            else {
                let reason = format!("route table {} was not created", name);
                let mut followups = vec![ids::tag(ROUTE_TABLE, name)];
                if has_route {
                    followups.push(ids::default_route(name));
                }
                followups.extend(table.subnets.iter().map(|s| ids::associate(name, s)));
                self.skip_all(followups, &reason);
                continue;
            };
            self.inventory
                .route_tables
                .insert(name.to_string(), rtb_id.clone());
            self.tag(ROUTE_TABLE, name, &rtb_id).await;

            let target = match &table.default_route {
                DefaultRoute::None => None,
                DefaultRoute::InternetGateway => Some(
                    self.inventory
                        .internet_gateway_id
                        .clone()
                        .map(RouteTarget::InternetGateway)
                        .ok_or_else(|| {
                            format!(
                                "internet gateway {} was not created",
                                topology.internet_gateway_name
                            )
                        }),
                ),
                DefaultRoute::NatGateway(nat) => Some(
                    self.inventory
                        .nat_gateways
                        .get(nat)
                        .cloned()
                        .map(RouteTarget::NatGateway)
                        .ok_or_else(|| format!("NAT gateway {} was not created", nat)),
                ),
            };
            let mut unrouted = None;
            match target {
                None => {}
                Some(Ok(target)) => {
                    let routed = self
                        .step(
                            ids::default_route(name),
                            format!("Routed {} via {} in {}", DEFAULT_ROUTE_CIDR, target, name),
                            provider.create_route(&rtb_id, DEFAULT_ROUTE_CIDR, &target),
                        )
                        .await;
                    if !routed {
                        self.inventory.mark_incomplete(name);
                    }
                }
                Some(Err(reason)) => {
                    self.skip(ids::default_route(name), &reason);
                    self.inventory.mark_incomplete(name);
                    unrouted = Some(reason);
                }
            }

            // A private table whose NAT gateway is missing keeps its subnets unassociated
            if let Some(reason) = unrouted
                && matches!(table.default_route, DefaultRoute::NatGateway(_))
            {
                self.skip_all(table.subnets.iter().map(|s| ids::associate(name, s)), &reason);
                continue;
            }

            for subnet in &table.subnets {
                let action_id = ids::associate(name, subnet);
                let Some(subnet_id) = self.inventory.subnets.get(subnet).cloned() else {
                    self.skip(action_id, &format!("subnet {} was not created", subnet));
                    self.inventory.mark_incomplete(name);
                    continue;
                };
                match self
                    .attempt(&action_id, provider.associate_route_table(&rtb_id, &subnet_id))
                    .await
                {
                    Some(association_id) => {
                        self.inventory
                            .associations
                            .insert(format!("{}/{}", name, subnet), association_id.clone());
                        self.completed(
                            action_id,
                            format!("Associated {} with {} ({})", subnet, name, association_id),
                        );
                    }
                    None => self.inventory.mark_incomplete(name),
                }
            }
        }
    }
}
