pub mod cluster;
mod object;
pub mod ticket_cluster;
pub mod ticket_machine;

pub use cluster::{CLUSTER_KIND, Cluster};
pub use ticket_cluster::{
    Priority, TICKET_CLUSTER_KIND, TicketCluster, TicketClusterSpec,
    TicketClusterStatus,
};
pub use ticket_machine::{
    TICKET_MACHINE_KIND, TicketMachine, TicketMachineSpec,
    TicketMachineStatus,
};
