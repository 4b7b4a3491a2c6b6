/// Ports module defining interfaces for hexagonal architecture
///
/// This module contains both inbound ports (driving ports - what HTTP
/// handlers read) and outbound ports (driven ports - inventory, scanner and
/// process execution).
pub mod inbound;
pub mod outbound;
