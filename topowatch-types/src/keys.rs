//! Well-known metadata, set and metric keys.
//!
//! Reporters and renderers agree on these names; nothing else in the report
//! format is keyed by convention.

/// Keys written by the process reporter.
pub mod process {
    pub const PID: &str = "pid";
    pub const NAME: &str = "name";
    pub const PPID: &str = "ppid";
    pub const CMDLINE: &str = "cmdline";
    pub const THREADS: &str = "threads";

    pub const CPU_USAGE: &str = "process_cpu_usage_percent";
    pub const MEMORY_USAGE: &str = "process_memory_usage_bytes";
}

/// Keys written by the docker reporter and tagger.
pub mod docker {
    pub const CONTAINER_ID: &str = "docker_container_id";
    pub const CONTAINER_NAME: &str = "docker_container_name";
    pub const CONTAINER_STATE: &str = "docker_container_state";
    pub const CONTAINER_HOSTNAME: &str = "docker_container_hostname";
    pub const CONTAINER_COMMAND: &str = "docker_container_command";
    pub const IMAGE_ID: &str = "docker_image_id";
    pub const IMAGE_NAME: &str = "docker_image_name";

    /// Set of the container's IP addresses in CIDR form.
    pub const CONTAINER_IPS: &str = "docker_container_ips";

    /// Prefix of metadata keys holding docker labels.
    pub const LABEL_PREFIX: &str = "docker_label_";

    pub const STATE_RUNNING: &str = "running";
    pub const STATE_STOPPED: &str = "stopped";
    pub const STATE_PAUSED: &str = "paused";

    pub const CPU_TOTAL_USAGE: &str = "docker_cpu_total_usage";
    pub const MEMORY_USAGE: &str = "docker_memory_usage";
}

/// Keys written by the host reporter.
pub mod host {
    pub const HOST_NAME: &str = "host_name";
    pub const OS: &str = "os";
    pub const KERNEL_VERSION: &str = "kernel_version";
    pub const UPTIME: &str = "uptime";

    /// Set of the CIDRs the host considers local.
    pub const LOCAL_NETWORKS: &str = "local_networks";

    pub const CPU_USAGE: &str = "host_cpu_usage_percent";
    pub const MEMORY_USAGE: &str = "host_mem_usage_bytes";
    pub const LOAD1: &str = "load1";
    pub const LOAD5: &str = "load5";
    pub const LOAD15: &str = "load15";
}

/// Keys written by the kubernetes reporter.
pub mod kubernetes {
    pub const POD_ID: &str = "kubernetes_pod_id";
    pub const POD_NAME: &str = "kubernetes_pod_name";
    pub const POD_STATE: &str = "kubernetes_pod_state";
    pub const NAMESPACE: &str = "kubernetes_namespace";
    pub const SERVICE_ID: &str = "kubernetes_service_id";
    pub const SERVICE_NAME: &str = "kubernetes_service_name";

    /// Set of `<ns>/<name>` service IDs selecting a pod.
    pub const SERVICE_IDS: &str = "kubernetes_service_ids";

    /// Docker label kubernetes puts on every container of a pod, holding `<ns>/<name>`.
    pub const POD_LABEL: &str = "io.kubernetes.pod.name";

    pub const SYSTEM_NAMESPACE: &str = "kube-system";
}

/// Keys written by the endpoint reporter.
pub mod endpoint {
    pub const ADDR: &str = "addr";
    pub const PORT: &str = "port";

    /// Set of names the address resolves back to.
    pub const REVERSE_DNS_NAMES: &str = "reverse_dns_names";
}

/// Keys stamped on every node by taggers.
pub mod tagging {
    pub const HOST_NODE_ID: &str = "host_node_id";
    pub const PROBE_ID: &str = "probe_id";
}
