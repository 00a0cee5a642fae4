use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;
use vpcflow_cloud::{
    AuthStatus, CloudError, ElasticIp, NetworkProvider, ResourceTag, Result, RouteTarget,
    VpcDnsAttribute,
};
use vpcflow_core::{ProvisionEvent, Reporter};

/// One provider call as seen by the fake
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub op: &'static str,
    pub args: Vec<String>,
}

#[derive(Default)]
struct Inner {
    calls: Vec<Call>,
    next_id: usize,
}

/// In-memory provider that records calls and hands out sequential ids
///
/// Failures are injected per operation, optionally narrowed to calls where
/// one of the arguments matches.
#[derive(Default)]
pub struct RecordingProvider {
    inner: Mutex<Inner>,
    failures: Vec<(&'static str, Option<String>)>,
}

#[allow(dead_code)]
impl RecordingProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call to `op` fails
    pub fn fail_on(mut self, op: &'static str) -> Self {
        self.failures.push((op, None));
        self
    }

    /// Calls to `op` with `arg` among their arguments fail
    pub fn fail_on_arg(mut self, op: &'static str, arg: impl Into<String>) -> Self {
        self.failures.push((op, Some(arg.into())));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.inner.lock().unwrap().calls.clone()
    }

    pub fn ops(&self) -> Vec<&'static str> {
        self.calls().into_iter().map(|c| c.op).collect()
    }

    pub fn calls_to(&self, op: &str) -> Vec<Call> {
        self.calls().into_iter().filter(|c| c.op == op).collect()
    }

    /// Position of the first call to `op`
    pub fn position(&self, op: &str) -> Option<usize> {
        self.calls().iter().position(|c| c.op == op)
    }

    /// Position of the last call to `op`
    pub fn last_position(&self, op: &str) -> Option<usize> {
        self.calls().iter().rposition(|c| c.op == op)
    }

    fn record(&self, op: &'static str, args: &[&str]) -> Result<()> {
        let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        let fails = self.failures.iter().any(|(failing, arg)| {
            *failing == op && arg.as_ref().is_none_or(|a| args.contains(a))
        });
        self.inner.lock().unwrap().calls.push(Call { op, args });

        if fails {
            Err(CloudError::ApiError(format!("{} rejected", op)))
        } else {
            Ok(())
        }
    }

    fn next_id(&self, prefix: &str) -> String {
        let mut inner = self.inner.lock().unwrap();
        inner.next_id += 1;
        format!("{}-{:04}", prefix, inner.next_id)
    }
}

#[async_trait]
impl NetworkProvider for RecordingProvider {
    fn name(&self) -> &str {
        "recording"
    }

    fn display_name(&self) -> &str {
        "Recording provider"
    }

    fn region(&self) -> &str {
        "ap-northeast-2"
    }

    async fn check_auth(&self) -> Result<AuthStatus> {
        self.record("check_auth", &[])?;
        Ok(AuthStatus::ok("test").with_zones(vec![
            "ap-northeast-2a".to_string(),
            "ap-northeast-2b".to_string(),
        ]))
    }

    async fn create_vpc(&self, cidr_block: &str) -> Result<String> {
        self.record("create_vpc", &[cidr_block])?;
        Ok(self.next_id("vpc"))
    }

    async fn enable_vpc_dns(&self, vpc_id: &str, attribute: VpcDnsAttribute) -> Result<()> {
        self.record("enable_vpc_dns", &[vpc_id, &attribute.to_string()])
    }

    async fn create_tags(&self, resource_id: &str, tags: &[ResourceTag]) -> Result<()> {
        let mut args = vec![resource_id.to_string()];
        args.extend(tags.iter().map(|t| format!("{}={}", t.key, t.value)));
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        self.record("create_tags", &args)
    }

    async fn create_internet_gateway(&self) -> Result<String> {
        self.record("create_internet_gateway", &[])?;
        Ok(self.next_id("igw"))
    }

    async fn attach_internet_gateway(&self, internet_gateway_id: &str, vpc_id: &str) -> Result<()> {
        self.record("attach_internet_gateway", &[internet_gateway_id, vpc_id])
    }

    async fn create_subnet(
        &self,
        vpc_id: &str,
        cidr_block: &str,
        availability_zone: &str,
    ) -> Result<String> {
        self.record("create_subnet", &[vpc_id, cidr_block, availability_zone])?;
        Ok(self.next_id("subnet"))
    }

    async fn enable_public_ip_on_launch(&self, subnet_id: &str) -> Result<()> {
        self.record("enable_public_ip_on_launch", &[subnet_id])
    }

    async fn allocate_elastic_ip(&self) -> Result<ElasticIp> {
        self.record("allocate_elastic_ip", &[])?;
        let allocation_id = self.next_id("eipalloc");
        Ok(ElasticIp {
            allocation_id,
            public_ip: Some("203.0.113.10".to_string()),
        })
    }

    async fn create_nat_gateway(&self, subnet_id: &str, allocation_id: &str) -> Result<String> {
        self.record("create_nat_gateway", &[subnet_id, allocation_id])?;
        Ok(self.next_id("nat"))
    }

    async fn wait_nat_gateway_available(
        &self,
        nat_gateway_id: &str,
        max_wait: Duration,
    ) -> Result<()> {
        let secs = max_wait.as_secs().to_string();
        self.record("wait_nat_gateway_available", &[nat_gateway_id, &secs])
    }

    async fn create_route_table(&self, vpc_id: &str) -> Result<String> {
        self.record("create_route_table", &[vpc_id])?;
        Ok(self.next_id("rtb"))
    }

    async fn create_route(
        &self,
        route_table_id: &str,
        destination_cidr_block: &str,
        target: &RouteTarget,
    ) -> Result<()> {
        self.record(
            "create_route",
            &[route_table_id, destination_cidr_block, target.id()],
        )
    }

    async fn associate_route_table(&self, route_table_id: &str, subnet_id: &str) -> Result<String> {
        self.record("associate_route_table", &[route_table_id, subnet_id])?;
        Ok(self.next_id("rtbassoc"))
    }
}

/// Reporter that keeps a readable trace of every event
#[derive(Default)]
pub struct RecordingReporter {
    pub events: Vec<String>,
}

#[allow(dead_code)]
impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.events.iter().filter(|e| e.starts_with(prefix)).count()
    }
}

impl Reporter for RecordingReporter {
    fn report(&mut self, event: ProvisionEvent<'_>) {
        let line = match event {
            ProvisionEvent::StageStarted { number, title, .. } => {
                format!("stage {} {}", number, title)
            }
            ProvisionEvent::Created {
                resource_type,
                name,
                id,
            } => format!("created {} {} {}", resource_type, name, id),
            ProvisionEvent::Completed { action_id, .. } => format!("completed {}", action_id),
            ProvisionEvent::WaitStarted { name, id } => format!("waiting {} {}", name, id),
            ProvisionEvent::Failed { action_id, .. } => format!("failed {}", action_id),
            ProvisionEvent::Skipped { action_id, .. } => format!("skipped {}", action_id),
        };
        self.events.push(line);
    }
}
