// Copyright (c) 2021 Tangram Robotics Inc. - All Rights Reserved
// Unauthorized copying of this file, via any medium is strictly prohibited
// Proprietary and confidential
// ----------------------------

//! Connection handle, auth, and REST actions against the Supabase project.

pub mod auth;
pub mod connection;
pub mod submissions;
