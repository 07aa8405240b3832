pub mod event_service;
pub mod gallery_service;
pub mod mail_service;
pub mod participant_service;
pub mod registration_service;
pub mod storage_service;
pub mod team_service;
