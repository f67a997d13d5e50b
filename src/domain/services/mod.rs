// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// 该模块包含页面理解的纯分析逻辑，均不做网络 I/O：
/// - 信号分析（signal_analyzer）：从初始HTML计算JS依赖评分
/// - 页面分类（page_classifier）：根据URL与HTML推断页面角色
/// - 策略选择（strategy_selector）：决策表与人工覆盖
/// - 内容块检测（block_detector）：表格、文章、列表与自定义块
/// - 模型构建（model_builder）：把内容块物化为抽取条目
/// - 结构化区域（structured）：导航、头部、搜索、主内容、侧栏、页脚
/// - 正文抽取（content_extraction）：进程内与远程方法的混合仲裁
/// - 质量评估（quality）：记录的数据质量分数
///
/// 远程正文抽取属于可选能力，失败时降级而不是报错。
pub mod block_detector;
pub mod content_extraction;
pub mod model_builder;
pub mod page_classifier;
pub mod quality;
pub mod signal_analyzer;
pub mod strategy_selector;
pub mod structured;
