// Crate entry point. Re-export modules so tests and binaries can import them easily.
//
// Responsibilities
// - Only declare and expose modules. No business logic here.
//
// Layers
// - core: pure domain (rasterization, horizon, forecast points) and ports.
// - application: per-room forecaster and the pipeline orchestrator.
// - adapters: in-memory and MySQL booking stores, the MSTL seasonal model, clocks.
// - shell: CLI, environment configuration, process exit contract.

pub mod core {
    pub mod ports;
    pub mod time_grid;
    pub mod occupancy {
        pub mod booking_event;
        pub mod rasterize;
        pub mod sample;
        pub mod working_hours;
    }
    pub mod forecast {
        pub mod horizon;
        pub mod point;
    }
}

pub mod application {
    pub mod errors;
    pub mod forecaster;
    pub mod pipeline;
}

pub mod adapters {
    pub mod clock;
    pub mod in_memory {
        pub mod in_memory_booking_store;
    }
    pub mod mysql {
        pub mod mysql_booking_store;
        pub mod mysql_config;
    }
    pub mod seasonal {
        pub mod mstl_model;
    }
}

pub mod shell {
    pub mod cli;
    pub mod config;
}
