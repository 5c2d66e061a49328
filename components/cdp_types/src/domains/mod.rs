// CDP Domain type definitions
// Contains type definitions for the domains the tracing client speaks

pub mod tracing;
