//! vCloud 数据模型
//!
//! 每种资源对应一个零大小的种类标记（见 [`kind`]）和一个 [`Entity`] 别名。
//! 属性表决定了实体可访问的属性，以及属性在 XML 解析结果中的位置。

use crate::model::Entity;

/// 实体种类标记及其属性表
pub mod kind {
    use crate::model::{EntityKind, Field};

    const FIELD_NAME: Field = Field::new("name", &["name"]);
    const FIELD_HREF: Field = Field::new("href", &["href"]);
    const FIELD_TYPE: Field = Field::new("type", &["type"]);
    const FIELD_DESCRIPTION: Field = Field::new("description", &["Description"]);
    const FIELD_STATUS: Field = Field::new("status", &["status"]);
    const FIELD_LINKS: Field = Field::new("links", &["Link"]);

    /// 组织
    pub struct Organization;

    impl EntityKind for Organization {
        const NAME: &'static str = "Organization";
        const RESOURCE_PATH: &'static str = "org";
        const FIELDS: &'static [Field] = &[
            FIELD_NAME,
            FIELD_HREF,
            FIELD_TYPE,
            FIELD_DESCRIPTION,
            Field::new("full_name", &["FullName"]),
            FIELD_LINKS,
        ];
    }

    /// 目录
    pub struct Catalog;

    impl EntityKind for Catalog {
        const NAME: &'static str = "Catalog";
        const RESOURCE_PATH: &'static str = "catalog";
        const FIELDS: &'static [Field] = &[
            FIELD_NAME,
            FIELD_HREF,
            FIELD_TYPE,
            FIELD_DESCRIPTION,
            Field::new("is_published", &["IsPublished"]),
            FIELD_LINKS,
        ];
    }

    /// 目录项
    pub struct CatalogItem;

    impl EntityKind for CatalogItem {
        const NAME: &'static str = "CatalogItem";
        const RESOURCE_PATH: &'static str = "catalogItem";
        const FIELDS: &'static [Field] = &[
            FIELD_NAME,
            FIELD_HREF,
            FIELD_TYPE,
            FIELD_DESCRIPTION,
            Field::new("entity_href", &["Entity", "href"]),
            Field::new("entity_type", &["Entity", "type"]),
        ];
    }

    /// 虚拟数据中心
    pub struct Vdc;

    impl EntityKind for Vdc {
        const NAME: &'static str = "Vdc";
        const RESOURCE_PATH: &'static str = "vdc";
        const FIELDS: &'static [Field] = &[
            FIELD_NAME,
            FIELD_HREF,
            FIELD_TYPE,
            FIELD_DESCRIPTION,
            FIELD_STATUS,
            Field::new("allocation_model", &["AllocationModel"]),
            Field::new("is_enabled", &["IsEnabled"]),
            Field::new("nic_quota", &["NicQuota"]),
            Field::new("network_quota", &["NetworkQuota"]),
            Field::new("vm_quota", &["VmQuota"]),
            FIELD_LINKS,
        ];
    }

    /// vApp
    pub struct VApp;

    impl EntityKind for VApp {
        const NAME: &'static str = "VApp";
        const RESOURCE_PATH: &'static str = "vApp";
        const FIELDS: &'static [Field] = &[
            FIELD_NAME,
            FIELD_HREF,
            FIELD_TYPE,
            FIELD_DESCRIPTION,
            FIELD_STATUS,
            Field::new("deployed", &["deployed"]),
            Field::new("owner", &["Owner", "User", "name"]),
            FIELD_LINKS,
        ];
    }

    /// vApp 模板
    pub struct VAppTemplate;

    impl EntityKind for VAppTemplate {
        const NAME: &'static str = "VAppTemplate";
        const RESOURCE_PATH: &'static str = "vAppTemplate";
        const FIELDS: &'static [Field] = &[
            FIELD_NAME,
            FIELD_HREF,
            FIELD_TYPE,
            FIELD_DESCRIPTION,
            FIELD_STATUS,
            Field::new("ovf_descriptor_uploaded", &["ovfDescriptorUploaded"]),
            FIELD_LINKS,
        ];
    }

    /// 虚拟机
    pub struct Vm;

    impl EntityKind for Vm {
        const NAME: &'static str = "Vm";
        const RESOURCE_PATH: &'static str = "vApp";
        const FIELDS: &'static [Field] = &[
            FIELD_NAME,
            FIELD_HREF,
            FIELD_TYPE,
            FIELD_DESCRIPTION,
            FIELD_STATUS,
            Field::new("deployed", &["deployed"]),
            Field::new(
                "operating_system",
                &["OperatingSystemSection", "Description"],
            ),
            Field::new(
                "computer_name",
                &["GuestCustomizationSection", "ComputerName"],
            ),
            FIELD_LINKS,
        ];
    }

    /// 异步任务
    pub struct Task;

    impl EntityKind for Task {
        const NAME: &'static str = "Task";
        const RESOURCE_PATH: &'static str = "task";
        const FIELDS: &'static [Field] = &[
            FIELD_NAME,
            FIELD_HREF,
            FIELD_TYPE,
            FIELD_STATUS,
            Field::new("operation", &["operation"]),
            Field::new("operation_name", &["operationName"]),
            Field::new("start_time", &["startTime"]),
            Field::new("end_time", &["endTime"]),
            Field::new("expiry_time", &["expiryTime"]),
            Field::new("progress", &["Progress"]),
            Field::new("owner", &["Owner", "name"]),
            Field::new("user", &["User", "name"]),
            Field::new("error_message", &["Error", "message"]),
            Field::new("error_code", &["Error", "majorErrorCode"]),
        ];
    }

    /// 组织网络
    pub struct Network;

    impl EntityKind for Network {
        const NAME: &'static str = "Network";
        const RESOURCE_PATH: &'static str = "network";
        const FIELDS: &'static [Field] = &[
            FIELD_NAME,
            FIELD_HREF,
            FIELD_TYPE,
            FIELD_DESCRIPTION,
            Field::new("fence_mode", &["Configuration", "FenceMode"]),
            Field::new(
                "gateway",
                &["Configuration", "IpScope", "Gateway"],
            ),
            Field::new(
                "netmask",
                &["Configuration", "IpScope", "Netmask"],
            ),
            Field::new("dns1", &["Configuration", "IpScope", "Dns1"]),
            Field::new("dns2", &["Configuration", "IpScope", "Dns2"]),
        ];
    }
}

pub type Organization = Entity<kind::Organization>;
pub type Catalog = Entity<kind::Catalog>;
pub type CatalogItem = Entity<kind::CatalogItem>;
pub type Vdc = Entity<kind::Vdc>;
pub type VApp = Entity<kind::VApp>;
pub type VAppTemplate = Entity<kind::VAppTemplate>;
pub type Vm = Entity<kind::Vm>;
pub type Task = Entity<kind::Task>;
pub type Network = Entity<kind::Network>;
