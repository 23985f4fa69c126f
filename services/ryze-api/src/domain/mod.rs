//! 领域层：实体、值对象、仓储接口与领域服务

pub mod entities;
pub mod repositories;
pub mod services;
pub mod value_objects;
